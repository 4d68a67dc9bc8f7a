//! Repository backend over raw session nodes.

use std::sync::Arc;

use resourcefs_core::{Backend, Error, Path, Repository, RepositoryConfig, TraversalFinder};

use crate::{Node, Session, SessionError};

/// Repository over a tree [`Session`] whose resources carry raw [`Node`]s.
pub type TreeRepository = Repository<TreeBackend>;

/// Open a [`TreeRepository`] with the default finder.
///
/// ```rust
/// use resourcefs_core::{path, QueryLanguage, RepositoryConfig, ResourceRepository};
/// use resourcefs_tree::Session;
///
/// let mut session = Session::new();
/// session.create_path(&path!("/cms/pages/home")).unwrap();
/// session.save().unwrap();
///
/// let repo = resourcefs_tree::repository(session, &RepositoryConfig::with_base_path("/cms")).unwrap();
/// let home = repo.get("/pages/home").unwrap();
/// assert_eq!(home.payload().path(), &path!("/cms/pages/home"));
/// assert!(repo.contains("/pages/*", QueryLanguage::Glob).unwrap());
/// ```
pub fn repository(
    session: Session,
    config: &RepositoryConfig,
) -> Result<Arc<TreeRepository>, Error> {
    Repository::from_config(TreeBackend::new(session), TraversalFinder, config)
}

pub struct TreeBackend {
    session: Session,
}

impl TreeBackend {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}

impl Backend for TreeBackend {
    type Entity = Node;

    fn fetch(&mut self, path: &Path) -> Result<Option<Node>, Error> {
        match self.session.node(path) {
            Ok(node) => Ok(Some(node)),
            Err(SessionError::PathNotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn children(&mut self, entity: &Node) -> Result<Vec<Node>, Error> {
        Ok(self.session.children(entity)?)
    }

    fn native_path(&self, entity: &Node) -> Result<Path, Error> {
        Ok(entity.path().clone())
    }

    fn native_name(&self, entity: &Node) -> Result<String, Error> {
        Ok(entity.name().to_string())
    }

    fn remove(&mut self, entity: &Node) -> Result<(), Error> {
        // Already gone with an ancestor removed earlier in the same batch.
        if !self.session.node_exists(entity.path()) {
            tracing::trace!(path = %entity.path(), "node already removed");
            return Ok(());
        }
        Ok(self.session.remove(entity.path())?)
    }

    fn move_to(&mut self, entity: &Node, target: &Path) -> Result<(), Error> {
        Ok(self.session.move_node(entity.path(), target)?)
    }

    fn commit(&mut self) -> Result<(), Error> {
        Ok(self.session.save()?)
    }
}
