//! Regression model and artifact persistence
//!
//! This module provides:
//! - The gradient-boosted trees regressor and its hyperparameters
//! - Regression evaluation metrics
//! - Whole-file load/save of the trained model artifact

pub mod gbm;
pub mod store;

pub use gbm::{GbtParams, GbtRegressor, ModelError, ModelMetrics};
pub use store::{ModelStore, PriceModel, StoreError};
