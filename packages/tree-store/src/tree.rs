//! Node records keyed by path components.
//!
//! Each record owns its children in insertion order, which is the order the
//! session enumerates them in.

use indexmap::IndexMap;
use resourcefs_core::Path;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::Properties;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct NodeRecord {
    pub(crate) identifier: Uuid,
    #[serde(default)]
    pub(crate) properties: Properties,
    #[serde(default)]
    pub(crate) children: IndexMap<String, NodeRecord>,
}

impl NodeRecord {
    pub(crate) fn new(properties: Properties) -> Self {
        Self::with_identifier(Uuid::new_v4(), properties)
    }

    pub(crate) fn with_identifier(identifier: Uuid, properties: Properties) -> Self {
        Self {
            identifier,
            properties,
            children: IndexMap::new(),
        }
    }

    /// Navigate to record if it exists.
    pub(crate) fn get(&self, path: &Path) -> Option<&NodeRecord> {
        let mut current = self;
        for component in &path.components {
            current = current.children.get(component)?;
        }
        Some(current)
    }

    /// Navigate to record if it exists (mutable).
    pub(crate) fn get_mut(&mut self, path: &Path) -> Option<&mut NodeRecord> {
        let mut current = self;
        for component in &path.components {
            current = current.children.get_mut(component)?;
        }
        Some(current)
    }

    /// Detach and return the subtree at a non-root path.
    ///
    /// Sibling order is preserved.
    pub(crate) fn detach(&mut self, path: &Path) -> Option<NodeRecord> {
        let parent = self.get_mut(&path.parent()?)?;
        parent.children.shift_remove(path.name()?)
    }

    /// Count of records in this subtree, including this one.
    pub(crate) fn len(&self) -> usize {
        1 + self.children.values().map(NodeRecord::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resourcefs_core::path;

    fn tree() -> NodeRecord {
        let mut root = NodeRecord::new(Properties::new());
        let mut a = NodeRecord::new(Properties::new());
        a.children
            .insert("x".to_string(), NodeRecord::new(Properties::new()));
        a.children
            .insert("y".to_string(), NodeRecord::new(Properties::new()));
        root.children.insert("a".to_string(), a);
        root.children
            .insert("b".to_string(), NodeRecord::new(Properties::new()));
        root
    }

    #[test]
    fn navigation() {
        let root = tree();
        assert!(root.get(&path!("/a/x")).is_some());
        assert!(root.get(&path!("/a/z")).is_none());
        assert_eq!(root.get(&Path::root()), Some(&root));
        assert_eq!(root.len(), 5);
    }

    #[test]
    fn detach_keeps_sibling_order() {
        let mut root = tree();
        root.children
            .insert("c".to_string(), NodeRecord::new(Properties::new()));
        let detached = root.detach(&path!("/b")).unwrap();
        assert!(detached.children.is_empty());
        let names: Vec<&String> = root.children.keys().collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn detach_root_is_refused() {
        let mut root = tree();
        assert!(root.detach(&Path::root()).is_none());
        assert!(root.detach(&path!("/missing")).is_none());
    }

    #[test]
    fn serde_round_trip_keeps_order() {
        let mut root = tree();
        root.children
            .insert("0-first".to_string(), NodeRecord::new(Properties::new()));
        let json = serde_json::to_string(&root).unwrap();
        let back: NodeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root);
        let names: Vec<&String> = back.children.keys().collect();
        assert_eq!(names, vec!["a", "b", "0-first"]);
    }
}
