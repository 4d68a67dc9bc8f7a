//! Identity map and change scheduling.

use std::collections::HashMap;

use resourcefs_core::Path;
use uuid::Uuid;

use crate::Document;

/// A change waiting for the next flush.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Change {
    Insert(Uuid),
    Move { oid: Uuid, target: Path },
    Remove(Uuid),
}

/// Tracks which documents are managed, where they live, and what is
/// scheduled to happen to them.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    documents: HashMap<Uuid, Document>,
    paths: HashMap<Uuid, Path>,
    ids: HashMap<Path, Uuid>,
    scheduled: Vec<Change>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current native path (document id) of a managed document.
    pub fn document_id(&self, document: &Document) -> Option<&Path> {
        self.paths.get(&document.oid())
    }

    pub fn is_managed(&self, document: &Document) -> bool {
        self.paths.contains_key(&document.oid())
    }

    /// Number of managed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn has_scheduled_changes(&self) -> bool {
        !self.scheduled.is_empty()
    }

    pub(crate) fn by_path(&self, path: &Path) -> Option<&Document> {
        self.documents.get(self.ids.get(path)?)
    }

    pub(crate) fn by_oid(&self, oid: &Uuid) -> Option<&Document> {
        self.documents.get(oid)
    }

    pub(crate) fn path_of(&self, oid: &Uuid) -> Option<&Path> {
        self.paths.get(oid)
    }

    pub(crate) fn register(&mut self, document: Document, path: Path) {
        let oid = document.oid();
        if let Some(previous) = self.paths.insert(oid, path.clone()) {
            self.ids.remove(&previous);
        }
        self.ids.insert(path, oid);
        self.documents.insert(oid, document);
    }

    pub(crate) fn schedule(&mut self, change: Change) {
        self.scheduled.push(change);
    }

    pub(crate) fn take_scheduled(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.scheduled)
    }

    /// Re-key every document at or below `origin` to live below `target`.
    pub(crate) fn relocate(&mut self, origin: &Path, target: &Path) {
        let moved: Vec<(Uuid, Path)> = self
            .paths
            .iter()
            .filter_map(|(oid, path)| {
                let rest = path.strip_prefix(origin)?;
                Some((*oid, target.join(&rest)))
            })
            .collect();

        for (oid, _) in &moved {
            if let Some(old) = self.paths.get(oid) {
                self.ids.remove(old);
            }
        }
        for (oid, path) in moved {
            self.ids.insert(path.clone(), oid);
            self.paths.insert(oid, path);
        }
    }

    /// Forget every document at or below `path`.
    pub(crate) fn detach_subtree(&mut self, path: &Path) {
        let gone: Vec<Uuid> = self
            .paths
            .iter()
            .filter(|(_, p)| p.has_prefix(path))
            .map(|(oid, _)| *oid)
            .collect();

        for oid in gone {
            if let Some(p) = self.paths.remove(&oid) {
                self.ids.remove(&p);
            }
            self.documents.remove(&oid);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.documents.clear();
        self.paths.clear();
        self.ids.clear();
        self.scheduled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resourcefs_core::path;
    use resourcefs_tree::Properties;

    fn register(uow: &mut UnitOfWork, path: &str) -> Document {
        let document = Document::new("Page", Properties::new());
        uow.register(document.clone(), Path::parse(path).unwrap());
        document
    }

    #[test]
    fn identity_lookup() {
        let mut uow = UnitOfWork::new();
        let document = register(&mut uow, "/a");
        assert_eq!(uow.document_id(&document), Some(&path!("/a")));
        assert_eq!(uow.by_path(&path!("/a")), Some(&document));
        assert!(uow.is_managed(&document));
        assert!(!uow.is_managed(&Document::new("Page", Properties::new())));
    }

    #[test]
    fn relocate_moves_descendants() {
        let mut uow = UnitOfWork::new();
        let a = register(&mut uow, "/a");
        let x = register(&mut uow, "/a/x");
        let other = register(&mut uow, "/ab");

        uow.relocate(&path!("/a"), &path!("/z/a2"));

        assert_eq!(uow.document_id(&a), Some(&path!("/z/a2")));
        assert_eq!(uow.document_id(&x), Some(&path!("/z/a2/x")));
        assert_eq!(uow.document_id(&other), Some(&path!("/ab")));
        assert!(uow.by_path(&path!("/a/x")).is_none());
        assert_eq!(uow.by_path(&path!("/z/a2/x")), Some(&x));
    }

    #[test]
    fn detach_subtree_forgets_descendants() {
        let mut uow = UnitOfWork::new();
        register(&mut uow, "/a");
        let x = register(&mut uow, "/a/x");
        register(&mut uow, "/b");

        uow.detach_subtree(&path!("/a"));

        assert_eq!(uow.len(), 1);
        assert!(!uow.is_managed(&x));
    }

    #[test]
    fn reregistering_replaces_old_path() {
        let mut uow = UnitOfWork::new();
        let document = register(&mut uow, "/a");
        uow.register(document.clone(), path!("/b"));
        assert!(uow.by_path(&path!("/a")).is_none());
        assert_eq!(uow.document_id(&document), Some(&path!("/b")));
    }
}
