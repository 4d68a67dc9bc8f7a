use resourcefs_core::{Path, PathError};

/// Errors raised by a [`Session`](crate::Session).
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("no node at \"{path}\"")]
    PathNotFound { path: Path },

    #[error("an item already exists at \"{path}\"")]
    ItemExists { path: Path },

    #[error("node name \"{name}\" at \"{path}\" contains glob metacharacters")]
    InvalidName { path: Path, name: String },

    #[error("cannot move \"{origin}\" to \"{target}\": {message}")]
    InvalidMove {
        origin: Path,
        target: Path,
        message: String,
    },

    #[error("the root node cannot be {operation}")]
    RootImmutable { operation: &'static str },

    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SessionError> for resourcefs_core::Error {
    fn from(error: SessionError) -> Self {
        resourcefs_core::Error::backend(error)
    }
}
