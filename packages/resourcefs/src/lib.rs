//! ResourceFS: path-addressed resources over tree-structured content stores.
//!
//! A repository resolves virtual paths and glob selectors against a base path
//! in a backing store and hands back resources. Two backends share one
//! contract: raw tree nodes (`tree`) and mapped documents (`odm`).

pub use resourcefs_odm as odm;
pub use resourcefs_tree as tree;

pub use resourcefs_core::{
    path, Backend, Error, Finder, Path, PathError, PathResolver, Query, QueryLanguage, Repository,
    RepositoryConfig, Resource, ResourceCollection, ResourceRepository, TraversalFinder,
};
pub use resourcefs_odm::{Document, DocumentManager, DocumentRepository};
pub use resourcefs_tree::{Node, Session, SessionConfig, TreeRepository};
