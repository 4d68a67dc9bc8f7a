//! Repository backend over mapped documents.

use std::sync::Arc;

use resourcefs_core::{Backend, Error, Path, Repository, RepositoryConfig, TraversalFinder};

use crate::{Document, DocumentManager, OdmError};

/// Repository whose resources carry mapped [`Document`]s.
pub type DocumentRepository = Repository<DocumentBackend>;

/// Open a [`DocumentRepository`] with the default finder.
pub fn repository(
    manager: DocumentManager,
    config: &RepositoryConfig,
) -> Result<Arc<DocumentRepository>, Error> {
    Repository::from_config(DocumentBackend::new(manager), TraversalFinder, config)
}

pub struct DocumentBackend {
    manager: DocumentManager,
}

impl DocumentBackend {
    pub fn new(manager: DocumentManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &DocumentManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut DocumentManager {
        &mut self.manager
    }
}

impl Backend for DocumentBackend {
    type Entity = Document;

    fn fetch(&mut self, path: &Path) -> Result<Option<Document>, Error> {
        Ok(self.manager.find(path)?)
    }

    fn children(&mut self, entity: &Document) -> Result<Vec<Document>, Error> {
        Ok(self.manager.children(entity)?)
    }

    fn native_path(&self, entity: &Document) -> Result<Path, Error> {
        self.manager
            .unit_of_work()
            .document_id(entity)
            .cloned()
            .ok_or_else(|| OdmError::Unmanaged { oid: entity.oid() }.into())
    }

    fn native_name(&self, entity: &Document) -> Result<String, Error> {
        let node = self.manager.node_for_document(entity)?;
        Ok(node.name().to_string())
    }

    fn remove(&mut self, entity: &Document) -> Result<(), Error> {
        Ok(self.manager.remove(entity)?)
    }

    fn move_to(&mut self, entity: &Document, target: &Path) -> Result<(), Error> {
        Ok(self.manager.move_document(entity, target)?)
    }

    fn commit(&mut self) -> Result<(), Error> {
        Ok(self.manager.flush()?)
    }
}
