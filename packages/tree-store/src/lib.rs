//! Tree-node backend for ResourceFS.
//!
//! - `Session`: an in-memory hierarchical node store with unit-of-work
//!   semantics and optional JSON snapshot persistence
//! - `Node`: the handle a session hands out for a node
//! - `TreeBackend` / `TreeRepository`: resources whose payload is the raw node

mod backend;
mod error;
mod node;
mod session;
mod tree;

pub use backend::{repository, TreeBackend, TreeRepository};
pub use error::SessionError;
pub use node::{Node, Properties};
pub use session::{Session, SessionConfig};
