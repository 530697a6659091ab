//! Business logic services

pub mod applier;
pub mod csv_import;
pub mod metadata;
pub mod reconciler;
pub mod registry;
pub mod report;
pub mod session;
