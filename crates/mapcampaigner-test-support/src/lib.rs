//! Shared test mocks and fixtures for the MapCampaigner campaign store.

mod clock;
mod fixtures;
mod logging;
mod repository;

pub use clock::FixedClock;
pub use fixtures::{
    campaign_attributes, campaign_document, square_geometry, square_geometry_text,
};
pub use logging::init_test_tracing;
pub use repository::{FailingDocumentRepository, VanishingDocumentRepository};
