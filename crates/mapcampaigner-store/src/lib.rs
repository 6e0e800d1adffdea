//! Storage backends for MapCampaigner campaign documents.
//!
//! `FsDocumentRepository` keeps one `<uuid>.json` file per campaign in a
//! dedicated directory. `InMemoryDocumentRepository` keeps the same shape in
//! a map and is used where no directory is wanted.

pub mod config;
pub mod fs_document_repository;
pub mod memory_document_repository;

pub use config::StoreConfig;
pub use fs_document_repository::FsDocumentRepository;
pub use memory_document_repository::InMemoryDocumentRepository;
