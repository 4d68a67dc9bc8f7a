//! Node handles returned by a session.

use resourcefs_core::Path;
use uuid::Uuid;

use crate::tree::NodeRecord;

/// Node properties: arbitrary JSON values keyed by name.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A node as seen by the session at the time it was fetched.
///
/// The identifier is stable across moves; the path is where the node lived
/// when the handle was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    identifier: Uuid,
    path: Path,
    properties: Properties,
}

impl Node {
    pub(crate) fn from_record(path: Path, record: &NodeRecord) -> Self {
        Self {
            identifier: record.identifier,
            path,
            properties: record.properties.clone(),
        }
    }

    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The node name; empty for the root node.
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or_default()
    }

    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}
