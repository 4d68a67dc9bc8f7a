//! Error types for resource repositories.

use crate::path::{Path, PathError};

/// Errors surfaced by a resource repository.
///
/// Backend-native failures are carried unchanged in [`Error::Backend`]; the
/// only backend condition that gets a kind of its own is "nothing exists at
/// this path", which every backend reports as [`Error::ResourceNotFound`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No backend entity exists at the resolved path.
    #[error("no resource found at \"{path}\"")]
    ResourceNotFound { path: Path },

    /// The capability is permanently absent from this repository.
    #[error("operation not supported: {operation}")]
    UnsupportedOperation { operation: String },

    /// The selector language is not understood.
    #[error("unsupported query language \"{language}\"")]
    UnsupportedQueryLanguage { language: String },

    /// A native path returned by the backend lies outside the base path.
    #[error("path \"{path}\" is outside of the repository base \"{base}\"")]
    PathOutOfScope { path: Path, base: Path },

    /// The selector could not be compiled.
    #[error("invalid selector \"{selector}\": {message}")]
    InvalidSelector { selector: String, message: String },

    /// A pattern move matched an entity along with one of its ancestors.
    #[error("cannot move \"{path}\" along with its ancestor \"{ancestor}\"")]
    OverlappingMatches { path: Path, ancestor: Path },

    /// The repository configuration could not be read.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Path validation error.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// The repository that produced a resource has been dropped.
    #[error("resource is no longer attached to a repository")]
    RepositoryDetached,

    /// A previous call panicked while holding the backend.
    #[error("backend lock poisoned")]
    Poisoned,

    /// Error raised by the backing store, passed through as-is.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap a backend-native error.
    pub fn backend(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Backend(Box::new(error))
    }

    /// True for [`Error::ResourceNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ResourceNotFound { .. })
    }

    /// Borrow the backend-native error if it has type `E`.
    pub fn backend_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Backend(e) => e.downcast_ref::<E>(),
            _ => None,
        }
    }
}
