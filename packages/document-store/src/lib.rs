//! Mapped-object backend for ResourceFS.
//!
//! Documents are stored in the nodes of a `resourcefs_tree::Session`. The
//! `DocumentManager` keeps an identity map and a unit of work on top of the
//! session, and `DocumentBackend` exposes it to the shared repository
//! orchestration, so resources carry documents instead of raw nodes.

mod backend;
mod document;
mod error;
mod manager;
mod unit_of_work;

pub use backend::{repository, DocumentBackend, DocumentRepository};
pub use document::{Document, CLASS_PROPERTY};
pub use error::OdmError;
pub use manager::DocumentManager;
pub use unit_of_work::UnitOfWork;
