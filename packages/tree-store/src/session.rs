//! A unit-of-work session over an in-memory node tree.
//!
//! Every mutation is applied to the session's working copy right away and is
//! visible to reads through the same session. `save` makes the working copy
//! the persisted state (and rewrites the snapshot file when one is
//! configured); `refresh` throws unsaved work away.

use std::fs;
use std::path::PathBuf;

use resourcefs_core::{is_glob_segment, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::{Node, Properties};
use crate::tree::NodeRecord;
use crate::SessionError;

/// Session configuration.
///
/// ```json
/// {"snapshot": "/var/lib/resourcefs/content.json"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JSON file holding the persisted tree. Loaded on open when it exists,
    /// rewritten on every save.
    pub snapshot: Option<PathBuf>,
}

pub struct Session {
    persisted: NodeRecord,
    working: NodeRecord,
    config: SessionConfig,
    dirty: bool,
}

impl Session {
    /// Create a session over an empty tree holding only the root node.
    pub fn new() -> Self {
        let root = NodeRecord::new(Properties::new());
        Self {
            persisted: root.clone(),
            working: root,
            config: SessionConfig::default(),
            dirty: false,
        }
    }

    /// Open a session, loading the snapshot file if it exists.
    pub fn open(config: SessionConfig) -> Result<Self, SessionError> {
        let root = match &config.snapshot {
            Some(file) if file.exists() => {
                tracing::debug!(snapshot = %file.display(), "loading snapshot");
                let bytes = fs::read(file)?;
                serde_json::from_slice(&bytes)?
            }
            _ => NodeRecord::new(Properties::new()),
        };
        Ok(Self {
            persisted: root.clone(),
            working: root,
            config,
            dirty: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn root(&self) -> Node {
        Node::from_record(Path::root(), &self.working)
    }

    /// Fetch the node at `path`.
    pub fn node(&self, path: &Path) -> Result<Node, SessionError> {
        self.working
            .get(path)
            .map(|record| Node::from_record(path.clone(), record))
            .ok_or_else(|| SessionError::PathNotFound { path: path.clone() })
    }

    pub fn node_exists(&self, path: &Path) -> bool {
        self.working.get(path).is_some()
    }

    /// Immediate children of `node`, in insertion order.
    pub fn children(&self, node: &Node) -> Result<Vec<Node>, SessionError> {
        let record = self
            .working
            .get(node.path())
            .ok_or_else(|| SessionError::PathNotFound {
                path: node.path().clone(),
            })?;

        record
            .children
            .iter()
            .map(|(name, child)| -> Result<Node, SessionError> {
                Ok(Node::from_record(node.path().child(name)?, child))
            })
            .collect()
    }

    /// Total number of nodes in the working copy, root included.
    pub fn node_count(&self) -> usize {
        self.working.len()
    }

    /// Add a node below an existing parent.
    pub fn add_node(&mut self, path: &Path, properties: Properties) -> Result<Node, SessionError> {
        self.add_node_with_identifier(path, Uuid::new_v4(), properties)
    }

    /// Add a node carrying a caller-chosen identifier.
    pub fn add_node_with_identifier(
        &mut self,
        path: &Path,
        identifier: Uuid,
        properties: Properties,
    ) -> Result<Node, SessionError> {
        let (parent_path, name) = match (path.parent(), path.name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => return Err(SessionError::ItemExists { path: path.clone() }),
        };
        check_name(path, name)?;

        let parent = self
            .working
            .get_mut(&parent_path)
            .ok_or(SessionError::PathNotFound { path: parent_path })?;
        if parent.children.contains_key(name) {
            return Err(SessionError::ItemExists { path: path.clone() });
        }

        let record = NodeRecord::with_identifier(identifier, properties);
        let node = Node::from_record(path.clone(), &record);
        parent.children.insert(name.to_string(), record);
        self.dirty = true;
        Ok(node)
    }

    /// Create `path` and any missing ancestors, returning the node at `path`.
    pub fn create_path(&mut self, path: &Path) -> Result<Node, SessionError> {
        let mut current = Path::root();
        for component in path.iter() {
            current = current.child(component)?;
            if !self.node_exists(&current) {
                self.add_node(&current, Properties::new())?;
            }
        }
        self.node(path)
    }

    pub fn set_property(
        &mut self,
        path: &Path,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), SessionError> {
        let record = self
            .working
            .get_mut(path)
            .ok_or_else(|| SessionError::PathNotFound { path: path.clone() })?;
        record.properties.insert(name.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// Remove the node at `path` together with its subtree.
    pub fn remove(&mut self, path: &Path) -> Result<(), SessionError> {
        if path.is_root() {
            return Err(SessionError::RootImmutable {
                operation: "removed",
            });
        }
        self.working
            .detach(path)
            .ok_or_else(|| SessionError::PathNotFound { path: path.clone() })?;
        self.dirty = true;
        Ok(())
    }

    /// Move the subtree at `origin` to `target`.
    ///
    /// `target` is the new path of the node itself; its parent must exist and
    /// it must not be taken. The node is appended after the target parent's
    /// existing children and keeps its identifier.
    pub fn move_node(&mut self, origin: &Path, target: &Path) -> Result<(), SessionError> {
        if origin.is_root() {
            return Err(SessionError::RootImmutable { operation: "moved" });
        }
        if !self.node_exists(origin) {
            return Err(SessionError::PathNotFound {
                path: origin.clone(),
            });
        }
        if target.has_prefix(origin) {
            return Err(SessionError::InvalidMove {
                origin: origin.clone(),
                target: target.clone(),
                message: "target lies inside the moved subtree".to_string(),
            });
        }
        let (Some(parent_path), Some(name)) = (target.parent(), target.name()) else {
            return Err(SessionError::ItemExists {
                path: target.clone(),
            });
        };
        check_name(target, name)?;
        if self.working.get(&parent_path).is_none() {
            return Err(SessionError::PathNotFound { path: parent_path });
        }
        if self.node_exists(target) {
            return Err(SessionError::ItemExists {
                path: target.clone(),
            });
        }

        let record = self
            .working
            .detach(origin)
            .ok_or_else(|| SessionError::PathNotFound {
                path: origin.clone(),
            })?;
        let parent = self
            .working
            .get_mut(&parent_path)
            .ok_or(SessionError::PathNotFound { path: parent_path })?;
        parent.children.insert(name.to_string(), record);
        self.dirty = true;

        tracing::trace!(origin = %origin, target = %target, "moved node");
        Ok(())
    }

    pub fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    /// Persist every pending change.
    pub fn save(&mut self) -> Result<(), SessionError> {
        if let Some(file) = &self.config.snapshot {
            tracing::debug!(snapshot = %file.display(), "writing snapshot");
            let json = serde_json::to_vec_pretty(&self.working)?;
            fs::write(file, json)?;
        }
        self.persisted = self.working.clone();
        self.dirty = false;
        Ok(())
    }

    /// Discard every unsaved change.
    pub fn refresh(&mut self) {
        self.working = self.persisted.clone();
        self.dirty = false;
    }
}

/// Node names must stay addressable by an exact selector.
fn check_name(path: &Path, name: &str) -> Result<(), SessionError> {
    if is_glob_segment(name) {
        return Err(SessionError::InvalidName {
            path: path.clone(),
            name: name.to_string(),
        });
    }
    Ok(())
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resourcefs_core::path;
    use serde_json::json;

    fn session() -> Session {
        let mut session = Session::new();
        for p in ["/cms", "/cms/a", "/cms/a/x", "/cms/a/y", "/cms/b"] {
            session.add_node(&path!(p), Properties::new()).unwrap();
        }
        session.save().unwrap();
        session
    }

    fn child_names(session: &Session, path: &str) -> Vec<String> {
        let node = session.node(&path!(path)).unwrap();
        session
            .children(&node)
            .unwrap()
            .iter()
            .map(|n| n.name().to_string())
            .collect()
    }

    #[test]
    fn fetch_missing_node() {
        let session = session();
        assert!(matches!(
            session.node(&path!("/cms/nope")),
            Err(SessionError::PathNotFound { .. })
        ));
    }

    #[test]
    fn children_in_insertion_order() {
        let mut session = session();
        session.add_node(&path!("/cms/0"), Properties::new()).unwrap();
        assert_eq!(child_names(&session, "/cms"), vec!["a", "b", "0"]);
        let children = session.children(&session.node(&path!("/cms")).unwrap()).unwrap();
        assert_eq!(children[0].path(), &path!("/cms/a"));
    }

    #[test]
    fn add_node_requires_parent_and_free_slot() {
        let mut session = session();
        assert!(matches!(
            session.add_node(&path!("/missing/x"), Properties::new()),
            Err(SessionError::PathNotFound { .. })
        ));
        assert!(matches!(
            session.add_node(&path!("/cms/a"), Properties::new()),
            Err(SessionError::ItemExists { .. })
        ));
        assert!(session.add_node(&Path::root(), Properties::new()).is_err());
    }

    #[test]
    fn glob_metacharacters_are_refused_in_names() {
        let mut session = session();
        for name in ["faq?", "a*", "[x]"] {
            let path = path!("/cms").child(name).unwrap();
            assert!(matches!(
                session.add_node(&path, Properties::new()),
                Err(SessionError::InvalidName { .. })
            ));
            assert!(matches!(
                session.move_node(&path!("/cms/b"), &path),
                Err(SessionError::InvalidName { .. })
            ));
        }
        assert!(matches!(
            session.create_path(&path!("/cms/new/faq?")),
            Err(SessionError::InvalidName { .. })
        ));
        assert!(session.node_exists(&path!("/cms/b")));
    }

    #[test]
    fn explicit_identifier_is_kept() {
        let mut session = session();
        let identifier = Uuid::new_v4();
        session
            .add_node_with_identifier(&path!("/cms/c"), identifier, Properties::new())
            .unwrap();
        assert_eq!(session.node(&path!("/cms/c")).unwrap().identifier(), identifier);
    }

    #[test]
    fn create_path_fills_ancestors() {
        let mut session = Session::new();
        let node = session.create_path(&path!("/a/b/c")).unwrap();
        assert_eq!(node.name(), "c");
        assert!(session.node_exists(&path!("/a/b")));
        assert_eq!(session.node_count(), 4);
    }

    #[test]
    fn properties_are_stored() {
        let mut session = session();
        session
            .set_property(&path!("/cms/a"), "title", json!("Hello"))
            .unwrap();
        let node = session.node(&path!("/cms/a")).unwrap();
        assert_eq!(node.property("title"), Some(&json!("Hello")));
    }

    #[test]
    fn remove_drops_subtree() {
        let mut session = session();
        session.remove(&path!("/cms/a")).unwrap();
        assert!(!session.node_exists(&path!("/cms/a/x")));
        assert!(matches!(
            session.remove(&Path::root()),
            Err(SessionError::RootImmutable { .. })
        ));
    }

    #[test]
    fn move_keeps_identifier_and_children() {
        let mut session = session();
        let before = session.node(&path!("/cms/a")).unwrap();
        session
            .move_node(&path!("/cms/a"), &path!("/cms/b/renamed"))
            .unwrap();
        let after = session.node(&path!("/cms/b/renamed")).unwrap();
        assert_eq!(before.identifier(), after.identifier());
        assert_eq!(child_names(&session, "/cms/b/renamed"), vec!["x", "y"]);
        assert!(!session.node_exists(&path!("/cms/a")));
    }

    #[test]
    fn invalid_moves() {
        let mut session = session();
        assert!(matches!(
            session.move_node(&path!("/cms/a"), &path!("/cms/a/x/inner")),
            Err(SessionError::InvalidMove { .. })
        ));
        assert!(matches!(
            session.move_node(&path!("/cms/a"), &path!("/cms/b")),
            Err(SessionError::ItemExists { .. })
        ));
        assert!(matches!(
            session.move_node(&path!("/cms/a"), &path!("/nowhere/a")),
            Err(SessionError::PathNotFound { .. })
        ));
        assert!(matches!(
            session.move_node(&path!("/cms/zz"), &path!("/cms/b/zz")),
            Err(SessionError::PathNotFound { .. })
        ));
        assert!(session.node_exists(&path!("/cms/a/x")));
    }

    #[test]
    fn refresh_discards_unsaved_changes() {
        let mut session = session();
        session.remove(&path!("/cms/b")).unwrap();
        assert!(session.has_pending_changes());
        session.refresh();
        assert!(!session.has_pending_changes());
        assert!(session.node_exists(&path!("/cms/b")));
    }

    #[test]
    fn save_makes_changes_survive_refresh() {
        let mut session = session();
        session.remove(&path!("/cms/b")).unwrap();
        session.save().unwrap();
        session.refresh();
        assert!(!session.node_exists(&path!("/cms/b")));
    }

    #[test]
    fn snapshot_is_written_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            snapshot: Some(dir.path().join("content.json")),
        };

        let mut session = Session::open(config.clone()).unwrap();
        session.create_path(&path!("/cms/pages/home")).unwrap();
        session
            .set_property(&path!("/cms/pages/home"), "title", json!("Home"))
            .unwrap();
        let identifier = session.node(&path!("/cms/pages/home")).unwrap().identifier();
        session.save().unwrap();

        let reopened = Session::open(config).unwrap();
        let node = reopened.node(&path!("/cms/pages/home")).unwrap();
        assert_eq!(node.identifier(), identifier);
        assert_eq!(node.property("title"), Some(&json!("Home")));
    }

    #[test]
    fn unsaved_changes_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            snapshot: Some(dir.path().join("content.json")),
        };

        let mut session = Session::open(config.clone()).unwrap();
        session.create_path(&path!("/draft")).unwrap();
        drop(session);

        let reopened = Session::open(config).unwrap();
        assert!(!reopened.node_exists(&path!("/draft")));
    }

    #[test]
    fn config_from_json() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"snapshot": "/tmp/content.json"}"#).unwrap();
        assert_eq!(config.snapshot, Some(PathBuf::from("/tmp/content.json")));
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }
}
