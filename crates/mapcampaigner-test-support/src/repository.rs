//! Test repositories: mock `DocumentRepository` implementations for tests.

use chrono::{DateTime, Utc};
use mapcampaigner_core::error::DomainError;
use mapcampaigner_core::repository::{DocumentRepository, StoredDocument};

/// A document repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingDocumentRepository;

impl DocumentRepository for FailingDocumentRepository {
    fn load_document(&self, _id: &str) -> Result<StoredDocument, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn save_document(&self, _id: &str, _contents: &str) -> Result<DateTime<Utc>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn create_document(&self, _id: &str, _contents: &str) -> Result<DateTime<Utc>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn list_ids(&self) -> Result<Vec<String>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}

/// Wraps a repository and additionally lists ids whose documents disappear
/// before they can be loaded, as when a file is removed mid-scan.
#[derive(Debug)]
pub struct VanishingDocumentRepository<R> {
    inner: R,
    vanished: Vec<String>,
}

impl<R: DocumentRepository> VanishingDocumentRepository<R> {
    /// Create a wrapper that lists `vanished` alongside the ids of `inner`.
    #[must_use]
    pub fn new(inner: R, vanished: &[&str]) -> Self {
        Self {
            inner,
            vanished: vanished.iter().map(|id| (*id).to_owned()).collect(),
        }
    }
}

impl<R: DocumentRepository> DocumentRepository for VanishingDocumentRepository<R> {
    fn load_document(&self, id: &str) -> Result<StoredDocument, DomainError> {
        if self.vanished.iter().any(|vanished| vanished == id) {
            return Err(DomainError::DoesNotExist(id.to_owned()));
        }
        self.inner.load_document(id)
    }

    fn save_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError> {
        self.inner.save_document(id, contents)
    }

    fn create_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError> {
        self.inner.create_document(id, contents)
    }

    fn list_ids(&self) -> Result<Vec<String>, DomainError> {
        let mut ids = self.inner.list_ids()?;
        ids.extend(self.vanished.iter().cloned());
        ids.sort();
        Ok(ids)
    }
}
