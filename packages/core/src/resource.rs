//! Resources: a virtual path bound to a backend payload.

use std::sync::{Arc, Weak};

use crate::{Error, Path, ResourceCollection, ResourceRepository};

/// Handle a resource keeps on the repository that produced it.
pub type RepositoryRef<E> = Weak<dyn ResourceRepository<Entity = E>>;

/// An immutable binding of a virtual path to a backend entity.
///
/// Resources are created on every fetch or query and never cached. The
/// payload is the backend's own handle (a tree node, a mapped document). The
/// repository is referenced weakly: it is used to enumerate children lazily,
/// and dropping it leaves existing resources readable but detached.
#[derive(Debug, Clone)]
pub struct Resource<E> {
    path: Path,
    payload: E,
    repository: RepositoryRef<E>,
}

impl<E> Resource<E> {
    pub fn new(path: Path, payload: E, repository: RepositoryRef<E>) -> Self {
        Self {
            path,
            payload,
            repository,
        }
    }

    /// The virtual path of this resource.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last component of the virtual path, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.path.name()
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }

    /// The owning repository, if it is still alive.
    pub fn repository(&self) -> Option<Arc<dyn ResourceRepository<Entity = E>>> {
        self.repository.upgrade()
    }

    /// List the immediate children of this resource through its repository.
    pub fn children(&self) -> Result<ResourceCollection<E>, Error> {
        let repository = self.repository().ok_or(Error::RepositoryDetached)?;
        repository.list_children(&self.path.to_string())
    }

    pub fn has_children(&self) -> Result<bool, Error> {
        Ok(!self.children()?.is_empty())
    }
}
