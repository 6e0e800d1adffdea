//! MapCampaigner Core: shared domain abstractions.
//!
//! This crate defines the error taxonomy and the persistence seam that the
//! campaign context and the storage backends depend on. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod repository;
