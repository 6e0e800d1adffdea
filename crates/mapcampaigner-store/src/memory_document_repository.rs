//! In-memory implementation of the `DocumentRepository` trait.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use mapcampaigner_core::clock::{Clock, SystemClock};
use mapcampaigner_core::error::DomainError;
use mapcampaigner_core::repository::{DocumentRepository, StoredDocument};

use crate::config::check_identifier;

/// Document repository backed by a map. Modification times come from the
/// injected clock.
pub struct InMemoryDocumentRepository {
    documents: Mutex<BTreeMap<String, StoredDocument>>,
    clock: Box<dyn Clock>,
}

impl InMemoryDocumentRepository {
    /// Creates an empty repository stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty repository stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            clock: Box::new(clock),
        }
    }

    /// Removes a document, as an external deletion of its backing file would.
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the internal lock is poisoned.
    pub fn remove_document(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.documents()?.remove(id).is_some())
    }

    fn documents(&self) -> Result<MutexGuard<'_, BTreeMap<String, StoredDocument>>, DomainError> {
        self.documents
            .lock()
            .map_err(|_| DomainError::Infrastructure("document map lock poisoned".into()))
    }

    fn put(
        documents: &mut BTreeMap<String, StoredDocument>,
        id: &str,
        contents: &str,
        modified_at: DateTime<Utc>,
    ) {
        documents.insert(
            id.to_owned(),
            StoredDocument {
                id: id.to_owned(),
                contents: contents.to_owned(),
                modified_at,
            },
        );
    }
}

impl Default for InMemoryDocumentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRepository for InMemoryDocumentRepository {
    fn load_document(&self, id: &str) -> Result<StoredDocument, DomainError> {
        self.documents()?
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::DoesNotExist(id.to_owned()))
    }

    fn save_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError> {
        check_identifier(id)?;
        let modified_at = self.clock.now();
        Self::put(&mut *self.documents()?, id, contents, modified_at);
        Ok(modified_at)
    }

    fn create_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError> {
        check_identifier(id)?;
        let mut documents = self.documents()?;
        if documents.contains_key(id) {
            return Err(DomainError::AlreadyExists(id.to_owned()));
        }
        let modified_at = self.clock.now();
        Self::put(&mut documents, id, contents, modified_at);
        Ok(modified_at)
    }

    fn list_ids(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.documents()?.keys().cloned().collect())
    }
}
