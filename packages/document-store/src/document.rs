//! Mapped documents.

use resourcefs_tree::{Node, Properties};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::OdmError;

/// Node property holding the document class.
pub const CLASS_PROPERTY: &str = "odm:class";

/// A mapped object: a class name plus named fields, identified by an oid.
///
/// The oid is the identity the mapper tracks; it is the identifier of the
/// node the document is stored in. Fields round-trip through `serde`, so any
/// struct that serializes to a JSON object can be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    oid: Uuid,
    class: String,
    fields: Properties,
}

impl Document {
    /// Class given to nodes that were not written by the mapper.
    pub const GENERIC_CLASS: &'static str = "Generic";

    /// A new, not yet persisted document.
    pub fn new(class: impl Into<String>, fields: Properties) -> Self {
        Self {
            oid: Uuid::new_v4(),
            class: class.into(),
            fields,
        }
    }

    /// Build a new document from any value serializing to a JSON object.
    pub fn from_object<T: Serialize>(class: &str, object: &T) -> Result<Self, OdmError> {
        match serde_json::to_value(object)? {
            serde_json::Value::Object(fields) => Ok(Self::new(class, fields)),
            _ => Err(OdmError::NotAnObject {
                class: class.to_string(),
            }),
        }
    }

    /// Deserialize the fields into a typed object.
    pub fn to_object<T: DeserializeOwned>(&self) -> Result<T, OdmError> {
        Ok(serde_json::from_value(serde_json::Value::Object(
            self.fields.clone(),
        ))?)
    }

    pub(crate) fn from_node(node: &Node) -> Self {
        let mut fields = node.properties().clone();
        let class = match fields.remove(CLASS_PROPERTY) {
            Some(serde_json::Value::String(class)) => class,
            _ => Self::GENERIC_CLASS.to_string(),
        };
        Self {
            oid: node.identifier(),
            class,
            fields,
        }
    }

    pub(crate) fn to_properties(&self) -> Properties {
        let mut properties = self.fields.clone();
        properties.insert(
            CLASS_PROPERTY.to_string(),
            serde_json::Value::String(self.class.clone()),
        );
        properties
    }

    pub fn oid(&self) -> Uuid {
        self.oid
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn fields(&self) -> &Properties {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}
