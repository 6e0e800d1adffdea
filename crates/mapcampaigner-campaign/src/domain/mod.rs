//! Domain layer for the campaign context.

pub mod aggregates;
pub mod codec;
pub mod commands;
pub mod filters;
pub mod geometry;
pub mod insights;
pub mod record;
pub mod validator;
