//! Training and prediction services
//!
//! This module provides:
//! - The trainer (split, encode, fit, hold-out evaluation)
//! - The prediction service wrapping the one loaded model

pub mod predictor;
pub mod trainer;

pub use predictor::{PredictionError, PredictionService};
pub use trainer::{TrainError, Trainer, TrainingReport};
