//! Document repository abstraction.
//!
//! A campaign is persisted as one JSON document keyed by its identifier.
//! Implementations do no locking: concurrent saves to the same key are
//! last-writer-wins. Creation is exclusive.

use chrono::{DateTime, Utc};

use crate::error::DomainError;

/// Stored representation of a campaign document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// Identifier the document is stored under.
    pub id: String,
    /// Raw document text.
    pub contents: String,
    /// Last modification time of the backing storage.
    pub modified_at: DateTime<Utc>,
}

/// Repository trait for reading and writing campaign documents.
pub trait DocumentRepository: Send + Sync {
    /// Load the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DoesNotExist` if nothing is stored under `id`.
    fn load_document(&self, id: &str) -> Result<StoredDocument, DomainError>;

    /// Overwrite (or create) the document stored under `id` and return its
    /// new modification time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the write fails.
    fn save_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError>;

    /// Store a brand-new document under `id` and return its modification time.
    /// Of several concurrent creates for one `id`, exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyExists` if a document is already stored
    /// under `id`.
    fn create_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError>;

    /// List the identifiers of all stored documents, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the listing fails.
    fn list_ids(&self) -> Result<Vec<String>, DomainError>;
}
