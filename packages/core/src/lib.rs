//! ResourceFS core: path-addressed resources over tree-shaped stores.
//!
//! This crate holds everything that does not depend on a particular backing
//! store:
//! - `Path`: normalized slash-delimited paths, also used for glob selectors
//! - `PathResolver`: mapping between virtual paths and the backend subtree
//! - `Resource` / `ResourceCollection`: what queries hand back
//! - `Backend` / `Finder`: the primitives a store must provide
//! - `Repository`: query and mutation orchestration shared by every store
//!
//! # Example
//!
//! ```rust
//! use resourcefs_core::{Error, QueryLanguage, ResourceRepository};
//!
//! fn titles<R: ResourceRepository>(repo: &R) -> Result<Vec<String>, Error> {
//!     let pages = repo.find("/pages/*", QueryLanguage::Glob)?;
//!     Ok(pages.iter().map(|r| r.path().to_string()).collect())
//! }
//! ```

mod backend;
mod collection;
mod config;
mod error;
mod finder;
mod path;
mod query;
mod repository;
mod resolver;
mod resource;

pub use backend::{Backend, Finder};
pub use collection::ResourceCollection;
pub use config::RepositoryConfig;
pub use error::Error;
pub use finder::TraversalFinder;
pub use path::{is_glob_segment, Path, PathError};
pub use query::{Query, QueryLanguage};
pub use repository::{Repository, ResourceRepository};
pub use resolver::PathResolver;
pub use resource::{RepositoryRef, Resource};
