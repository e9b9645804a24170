//! Data module for real-estate records and dataset ingestion
//!
//! This module provides:
//! - Property record types (district, room class, area)
//! - Labeled dataset structures for training
//! - CSV loading with row-level validation

pub mod loader;
pub mod types;

pub use loader::{load_dataset, DataError};
pub use types::{Dataset, District, PropertyRecord, RecordError, TypeLabel};
