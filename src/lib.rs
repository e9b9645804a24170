//! Real-estate price prediction engine
//!
//! This library trains a gradient-boosted trees model on scraped property
//! listings and serves single-price predictions and district market reports.
//!
//! # Modules
//!
//! - [`data`] - Property records, the district set and CSV dataset loading
//! - [`features`] - Deterministic feature encoding shared by train and predict
//! - [`models`] - The boosted-tree regressor and model artifact persistence
//! - [`engine`] - The trainer and the thread-safe prediction service
//! - [`report`] - Price and budget reports rendered as HTML artifacts
//! - [`app`] - The application controller sequencing train → save → ready
//!
//! # Example
//!
//! ```rust,no_run
//! use rust_estate::app::{ApplicationController, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let controller = ApplicationController::new(EngineConfig::default());
//!
//!     // Train from ./data.csv, save the artifact, go ready
//!     controller.start_application().await?;
//!
//!     let price = controller.predict_price(100.0, "Lisboa", "t2").await?;
//!     println!("Predicted price: {:.2} €", price);
//!
//!     let report = controller.generate_price_report(100.0, "t2").await?;
//!     println!("Report written to {}", report.display());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod data;
pub mod engine;
pub mod features;
pub mod models;
pub mod report;

// Re-export commonly used items at the crate level
pub use app::{ApplicationController, EngineConfig, EngineError};
pub use data::{Dataset, District, PropertyRecord, TypeLabel};
pub use engine::{PredictionService, Trainer, TrainingReport};
pub use models::{GbtParams, GbtRegressor, ModelStore, PriceModel};
pub use report::ReportGenerator;
