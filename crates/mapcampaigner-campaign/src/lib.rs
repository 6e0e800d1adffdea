//! MapCampaigner: campaign bounded context.
//!
//! A campaign is one JSON document per record. This crate owns the record
//! model, the document codec and validator, the campaign entity with its
//! versioned save cycle, and the directory-scan queries (list all, nearest
//! by coordinate) layered on a `DocumentRepository`.

pub mod application;
pub mod domain;
