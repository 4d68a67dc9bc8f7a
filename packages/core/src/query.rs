//! Queries: exact paths versus glob selectors.

use std::fmt;

use crate::{Error, Path};

/// The language a selector is written in.
///
/// Only [`QueryLanguage::Glob`] is understood by the repositories in this
/// workspace; anything else is carried so it can be reported back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum QueryLanguage {
    #[default]
    Glob,
    Other(String),
}

impl QueryLanguage {
    /// Fail with [`Error::UnsupportedQueryLanguage`] unless this is glob.
    pub fn ensure_supported(&self) -> Result<(), Error> {
        match self {
            QueryLanguage::Glob => Ok(()),
            QueryLanguage::Other(language) => Err(Error::UnsupportedQueryLanguage {
                language: language.clone(),
            }),
        }
    }
}

impl From<&str> for QueryLanguage {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("glob") {
            QueryLanguage::Glob
        } else {
            QueryLanguage::Other(s.to_string())
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryLanguage::Glob => write!(f, "glob"),
            QueryLanguage::Other(language) => write!(f, "{}", language),
        }
    }
}

/// A parsed query over virtual paths.
///
/// Which variant a query is decides how it is resolved (direct fetch or
/// finder search) and how `move` fans out over the matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// A literal path naming at most one entity.
    Exact(Path),
    /// A glob selector that may match any number of entities.
    Pattern(Path),
}

impl Query {
    /// Parse a selector, classifying it by the presence of glob metacharacters.
    pub fn parse(selector: &str) -> Result<Self, Error> {
        let path = Path::parse(selector)?;
        Ok(Self::from_path(path))
    }

    pub fn from_path(path: Path) -> Self {
        if path.is_glob() {
            Query::Pattern(path)
        } else {
            Query::Exact(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Query::Exact(path) | Query::Pattern(path) => path,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Query::Pattern(_))
    }
}
