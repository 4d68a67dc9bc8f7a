//! Path type shared by virtual paths, native paths and glob selectors.

use std::fmt;

/// Errors related to path parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path component cannot be used as a node name.
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
    /// The path string is invalid.
    InvalidPath { message: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidComponent {
                component,
                position,
                message,
            } => {
                write!(
                    f,
                    "invalid path component '{}' at position {}: {}",
                    component, position, message
                )
            }
            PathError::InvalidPath { message } => {
                write!(f, "invalid path: {}", message)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Characters that turn a component into a glob segment.
const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// An absolute, normalized, slash-delimited path.
///
/// The same type addresses resources from the caller's side (virtual paths),
/// nodes inside a backend (native paths), and glob selectors. Components are
/// arbitrary node names; only the relative segments `.` and `..` and control
/// characters are refused.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// The root path `/`.
    pub fn root() -> Self {
        Path {
            components: Vec::new(),
        }
    }

    /// Parse a path string, validating components.
    ///
    /// # Path Syntax
    ///
    /// - Components are separated by `/`
    /// - Empty components are ignored (normalizes `//`, leading and trailing `/`)
    /// - The empty string is the root
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resourcefs_core::Path;
    ///
    /// let path = Path::parse("/cms/pages/home").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path.to_string(), "/cms/pages/home");
    ///
    /// assert_eq!(Path::parse("cms//pages/").unwrap(), Path::parse("/cms/pages").unwrap());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let components: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        Self::try_from_components(components)
    }

    /// Try to create a path from components, validating each.
    pub fn try_from_components(components: Vec<String>) -> Result<Self, PathError> {
        for (i, component) in components.iter().enumerate() {
            Self::validate_component(component, i)?;
        }
        Ok(Path { components })
    }

    fn validate_component(component: &str, position: usize) -> Result<(), PathError> {
        let invalid = |message: &str| PathError::InvalidComponent {
            component: component.to_string(),
            position,
            message: message.to_string(),
        };

        if component.is_empty() {
            return Err(invalid("empty component"));
        }
        if component.contains('/') {
            return Err(invalid("component contains a separator"));
        }
        if component == "." || component == ".." {
            return Err(invalid("relative segments are not supported"));
        }
        if let Some(c) = component.chars().find(|c| c.is_control()) {
            return Err(PathError::InvalidComponent {
                component: component.to_string(),
                position,
                message: format!("invalid character {:?}", c),
            });
        }
        Ok(())
    }

    /// Check if this path is the root.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Alias of [`Path::is_root`].
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        Path { components }
    }

    /// Append a single validated component.
    pub fn child(&self, name: &str) -> Result<Path, PathError> {
        Self::validate_component(name, self.components.len())?;
        let mut components = self.components.clone();
        components.push(name.to_string());
        Ok(Path { components })
    }

    /// The parent path, `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.components.split_last()?;
        Some(Path {
            components: rest.to_vec(),
        })
    }

    /// The last component, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Check if this path has the given prefix.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        prefix.components.len() <= self.components.len()
            && prefix.components == self.components[..prefix.components.len()]
    }

    /// Strip a prefix from this path.
    ///
    /// Returns `None` if the prefix doesn't match.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if self.has_prefix(prefix) {
            Some(Path {
                components: self.components[prefix.components.len()..].to_vec(),
            })
        } else {
            None
        }
    }

    /// True if any component carries glob metacharacters.
    pub fn is_glob(&self) -> bool {
        self.components.iter().any(|c| is_glob_segment(c))
    }
}

/// True if a single segment carries glob metacharacters.
pub fn is_glob_segment(segment: &str) -> bool {
    segment.contains(GLOB_CHARS)
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.components.join("/"))
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.components[i]
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use resourcefs_core::path;
///
/// let p = path!("/cms/pages");
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
