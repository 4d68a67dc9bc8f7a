//! The document manager: maps tree nodes to documents.

use resourcefs_core::{is_glob_segment, Path};
use resourcefs_tree::{Node, Session, SessionError};

use crate::unit_of_work::{Change, UnitOfWork};
use crate::{Document, OdmError};

/// Maps the nodes of a [`Session`] to [`Document`]s.
///
/// Reads go straight to the session and hydrate documents into the identity
/// map, so asking twice for the same node yields the same oid. Writes
/// (`persist`, `move_document`, `remove`) are only scheduled; `flush` applies
/// them in the order they were made and saves the session once.
pub struct DocumentManager {
    session: Session,
    unit_of_work: UnitOfWork,
}

impl DocumentManager {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            unit_of_work: UnitOfWork::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.unit_of_work
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Find the document stored at `path`, `None` if there is none.
    pub fn find(&mut self, path: &Path) -> Result<Option<Document>, OdmError> {
        if let Some(document) = self.unit_of_work.by_path(path) {
            return Ok(Some(document.clone()));
        }
        match self.session.node(path) {
            Ok(node) => Ok(Some(self.hydrate(&node))),
            Err(SessionError::PathNotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The child documents of `document`, in node order.
    pub fn children(&mut self, document: &Document) -> Result<Vec<Document>, OdmError> {
        let node = self.node_for_document(document)?;
        let children = self.session.children(&node)?;
        Ok(children.iter().map(|child| self.hydrate(child)).collect())
    }

    /// The node currently backing `document`.
    pub fn node_for_document(&self, document: &Document) -> Result<Node, OdmError> {
        let path = self.document_path(document)?;
        Ok(self.session.node(path)?)
    }

    /// Schedule a new document for insertion at `path`.
    pub fn persist(&mut self, path: &Path, document: Document) -> Result<(), OdmError> {
        if self.unit_of_work.by_path(path).is_some() || self.session.node_exists(path) {
            return Err(SessionError::ItemExists { path: path.clone() }.into());
        }
        if let Some(name) = path.name().filter(|name| is_glob_segment(name)) {
            return Err(SessionError::InvalidName {
                path: path.clone(),
                name: name.to_string(),
            }
            .into());
        }
        let oid = document.oid();
        self.unit_of_work.register(document, path.clone());
        self.unit_of_work.schedule(Change::Insert(oid));
        Ok(())
    }

    /// Schedule `document` to be moved so that it lives at `target`.
    pub fn move_document(&mut self, document: &Document, target: &Path) -> Result<(), OdmError> {
        self.document_path(document)?;
        self.unit_of_work.schedule(Change::Move {
            oid: document.oid(),
            target: target.clone(),
        });
        Ok(())
    }

    /// Schedule `document` and its descendants for removal.
    pub fn remove(&mut self, document: &Document) -> Result<(), OdmError> {
        self.document_path(document)?;
        self.unit_of_work.schedule(Change::Remove(document.oid()));
        Ok(())
    }

    /// Apply every scheduled change and save the session.
    ///
    /// Changes are applied in scheduling order. If one fails, the ones before
    /// it stay applied to the session's working copy, which is not saved.
    pub fn flush(&mut self) -> Result<(), OdmError> {
        let changes = self.unit_of_work.take_scheduled();
        tracing::debug!(changes = changes.len(), "flushing unit of work");
        for change in changes {
            self.apply(change)?;
        }
        self.session.save()?;
        Ok(())
    }

    /// Drop every managed document and scheduled change.
    pub fn clear(&mut self) {
        self.unit_of_work.clear();
    }

    fn apply(&mut self, change: Change) -> Result<(), OdmError> {
        match change {
            Change::Insert(oid) => {
                let (Some(document), Some(path)) = (
                    self.unit_of_work.by_oid(&oid),
                    self.unit_of_work.path_of(&oid),
                ) else {
                    return Ok(());
                };
                self.session
                    .add_node_with_identifier(path, oid, document.to_properties())?;
            }
            Change::Move { oid, target } => {
                let path = self
                    .unit_of_work
                    .path_of(&oid)
                    .cloned()
                    .ok_or(OdmError::Unmanaged { oid })?;
                self.session.move_node(&path, &target)?;
                self.unit_of_work.relocate(&path, &target);
            }
            Change::Remove(oid) => {
                // Gone already if an ancestor was removed earlier in this flush.
                let Some(path) = self.unit_of_work.path_of(&oid).cloned() else {
                    tracing::trace!(%oid, "document already removed");
                    return Ok(());
                };
                if self.session.node_exists(&path) {
                    self.session.remove(&path)?;
                }
                self.unit_of_work.detach_subtree(&path);
            }
        }
        Ok(())
    }

    fn hydrate(&mut self, node: &Node) -> Document {
        if let Some(document) = self.unit_of_work.by_oid(&node.identifier()) {
            return document.clone();
        }
        let document = Document::from_node(node);
        self.unit_of_work
            .register(document.clone(), node.path().clone());
        document
    }

    fn document_path(&self, document: &Document) -> Result<&Path, OdmError> {
        self.unit_of_work
            .document_id(document)
            .ok_or(OdmError::Unmanaged {
                oid: document.oid(),
            })
    }
}
