//! Contracts the repository consumes from a backing store.

use crate::{Error, Path};

/// Primitives a backing store provides to a [`Repository`](crate::Repository).
///
/// An entity is whatever the store hands out for a node: a raw tree node, a
/// mapped document, etc. Entities are handles owned by the backend; the
/// repository passes them through without copying their contents.
///
/// Mutations (`remove`, `move_to`) are buffered by the backend and only
/// become durable on [`Backend::commit`].
pub trait Backend: Send + 'static {
    type Entity: Clone + Send + Sync + 'static;

    /// Fetch the entity at a native path.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Nothing exists at the path. Backends fold their own
    ///   not-found condition into this.
    /// * `Ok(Some(entity))` - The entity at the path.
    /// * `Err(Error)` - Any other backend failure.
    fn fetch(&mut self, path: &Path) -> Result<Option<Self::Entity>, Error>;

    /// Immediate children of an entity in native enumeration order.
    fn children(&mut self, entity: &Self::Entity) -> Result<Vec<Self::Entity>, Error>;

    /// The native path the entity currently lives at.
    fn native_path(&self, entity: &Self::Entity) -> Result<Path, Error>;

    /// The entity's own node name (last native path component).
    fn native_name(&self, entity: &Self::Entity) -> Result<String, Error>;

    /// Mark the entity deleted in the working set.
    fn remove(&mut self, entity: &Self::Entity) -> Result<(), Error>;

    /// Reposition the entity at a new native path.
    fn move_to(&mut self, entity: &Self::Entity, target: &Path) -> Result<(), Error>;

    /// Flush every buffered mutation.
    fn commit(&mut self) -> Result<(), Error>;
}

/// Resolves a glob selector into the matching entities of a backend.
pub trait Finder<B: Backend>: Send + Sync + 'static {
    /// Find every entity whose native path matches `pattern`.
    fn find(&self, backend: &mut B, pattern: &Path) -> Result<Vec<B::Entity>, Error>;

    /// Whether anything matches `pattern`.
    ///
    /// The default runs a full search; finders that can stop early should
    /// override it.
    fn any(&self, backend: &mut B, pattern: &Path) -> Result<bool, Error> {
        Ok(!self.find(backend, pattern)?.is_empty())
    }
}

impl<B: Backend, F: Finder<B> + ?Sized> Finder<B> for Box<F> {
    fn find(&self, backend: &mut B, pattern: &Path) -> Result<Vec<B::Entity>, Error> {
        self.as_ref().find(backend, pattern)
    }

    fn any(&self, backend: &mut B, pattern: &Path) -> Result<bool, Error> {
        self.as_ref().any(backend, pattern)
    }
}
