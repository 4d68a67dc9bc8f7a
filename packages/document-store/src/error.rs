use resourcefs_tree::SessionError;
use uuid::Uuid;

/// Errors raised by the document manager.
#[derive(thiserror::Error, Debug)]
pub enum OdmError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("document {oid} is not managed by this document manager")]
    Unmanaged { oid: Uuid },

    #[error("a {class} document must serialize to an object")]
    NotAnObject { class: String },

    #[error("document serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<OdmError> for resourcefs_core::Error {
    fn from(error: OdmError) -> Self {
        resourcefs_core::Error::backend(error)
    }
}
