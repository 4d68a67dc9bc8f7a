//! Repository configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Path, PathError};

/// Configuration shared by every repository flavour.
///
/// ```json
/// {"base_path": "/cms/content"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Native path that the virtual root maps onto.
    pub base_path: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
        }
    }
}

impl RepositoryConfig {
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }

    /// The validated base path.
    pub fn base(&self) -> Result<Path, PathError> {
        Path::parse(&self.base_path)
    }
}
