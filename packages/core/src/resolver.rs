//! Translation between virtual paths and backend-native paths.

use crate::{Error, Path};

/// Maps virtual paths onto a backend subtree rooted at a fixed base path.
///
/// ```rust
/// use resourcefs_core::{path, PathResolver};
///
/// let resolver = PathResolver::new(path!("/cms/content"));
/// let native = resolver.resolve(&path!("/pages/home"));
/// assert_eq!(native.to_string(), "/cms/content/pages/home");
/// assert_eq!(resolver.unresolve(&native).unwrap(), path!("/pages/home"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    base: Path,
}

impl PathResolver {
    pub fn new(base: Path) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Virtual path to native path.
    pub fn resolve(&self, path: &Path) -> Path {
        self.base.join(path)
    }

    /// Native path back to virtual path.
    ///
    /// Fails with [`Error::PathOutOfScope`] when `native` is not below the
    /// base path. That only happens when the backend hands back something the
    /// repository never asked for, so it is reported rather than passed on.
    pub fn unresolve(&self, native: &Path) -> Result<Path, Error> {
        native
            .strip_prefix(&self.base)
            .ok_or_else(|| Error::PathOutOfScope {
                path: native.clone(),
                base: self.base.clone(),
            })
    }
}
