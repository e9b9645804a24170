//! Application controller wiring the engine together
//!
//! One explicitly-constructed controller instance owns the trainer, the model
//! store, the prediction service and the report generator. Startup sequences
//! train → save → ready before any prediction is accepted; a second training
//! request while one is running is rejected rather than queued.

use crate::data::{load_dataset, DataError, TypeLabel};
use crate::engine::{PredictionError, PredictionService, TrainError, Trainer, TrainingReport};
use crate::models::{ModelStore, StoreError};
use crate::report::{ReportError, ReportGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Engine-level error taxonomy surfaced to the presentation layer
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("data loading failed")]
    Data(#[from] DataError),

    #[error("model training failed")]
    Train(#[from] TrainError),

    #[error("model store operation failed")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("report generation failed")]
    Report(#[from] ReportError),

    #[error("training task failed: {0}")]
    TrainingTask(String),

    #[error("a training run is already in progress")]
    TrainingInProgress,
}

/// Filesystem configuration for one engine deployment
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Training dataset (CSV)
    pub data_path: PathBuf,
    /// Authoritative model artifact path
    pub model_path: PathBuf,
    /// Directory report artifacts are written under
    pub reports_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data.csv"),
            model_path: PathBuf::from("./realEstateModel.zip"),
            reports_dir: PathBuf::from("./reports"),
        }
    }
}

/// Owns the engine components and routes presentation-layer requests
#[derive(Debug)]
pub struct ApplicationController {
    config: EngineConfig,
    trainer: Trainer,
    store: ModelStore,
    service: Arc<PredictionService>,
    reports: ReportGenerator,
    // Serializes training so only one fit touches the artifact path at a time
    training_gate: Mutex<()>,
}

impl ApplicationController {
    /// Construct a controller from a configuration
    pub fn new(config: EngineConfig) -> Self {
        let store = ModelStore::new(config.model_path.clone());
        let service = Arc::new(PredictionService::new());
        let reports = ReportGenerator::new(Arc::clone(&service), config.reports_dir.clone());

        Self {
            config,
            trainer: Trainer::new(),
            store,
            service,
            reports,
            training_gate: Mutex::new(()),
        }
    }

    /// Train from the configured dataset, save the artifact and go ready
    ///
    /// The load-and-fit step runs on a blocking worker; the training gate is
    /// held for the whole run, so a second call fails immediately instead of
    /// queueing.
    pub async fn start_application(&self) -> Result<TrainingReport, EngineError> {
        let _gate = self
            .training_gate
            .try_lock()
            .map_err(|_| EngineError::TrainingInProgress)?;

        info!(data = %self.config.data_path.display(), "starting application");
        let data_path = self.config.data_path.clone();
        let trainer = self.trainer.clone();
        let (model, report) = tokio::task::spawn_blocking(move || {
            let dataset = load_dataset(&data_path)?;
            Ok::<_, EngineError>(trainer.fit(&dataset)?)
        })
        .await
        .map_err(|e| EngineError::TrainingTask(e.to_string()))??;
        self.store.save(&model)?;
        self.service.install(model).await;

        info!("application ready");
        Ok(report)
    }

    /// Reload an existing artifact if one exists, otherwise train from scratch
    ///
    /// Returns the training report when a fresh fit was needed.
    pub async fn start_or_reload(&self) -> Result<Option<TrainingReport>, EngineError> {
        match self.store.load() {
            Ok(model) => {
                self.service.install(model).await;
                info!("application ready (reloaded existing artifact)");
                Ok(None)
            }
            Err(StoreError::NotFound(path)) => {
                warn!(path = %path.display(), "no model artifact, training from scratch");
                self.start_application().await.map(Some)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the engine can serve predictions
    pub async fn is_ready(&self) -> bool {
        self.service.is_loaded().await
    }

    /// Predict a sale price from raw inputs
    pub async fn predict_price(
        &self,
        area: f64,
        district: &str,
        type_label: &str,
    ) -> Result<f64, EngineError> {
        Ok(self
            .service
            .predict_price_for(area, district, type_label)
            .await?)
    }

    /// Generate the price-by-district report, returning the artifact path
    pub async fn generate_price_report(
        &self,
        area: f64,
        type_label: &str,
    ) -> Result<PathBuf, EngineError> {
        let label = parse_label(type_label)?;
        Ok(self.reports.generate_price_report(area, label).await?)
    }

    /// Generate the max-affordable-area report, returning the artifact path
    pub async fn generate_budget_report(
        &self,
        max_budget: f64,
        type_label: &str,
    ) -> Result<PathBuf, EngineError> {
        let label = parse_label(type_label)?;
        Ok(self.reports.generate_budget_report(max_budget, label).await?)
    }
}

fn parse_label(type_label: &str) -> Result<TypeLabel, EngineError> {
    type_label.parse().map_err(|_| {
        EngineError::Prediction(PredictionError::InvalidTypeLabel(type_label.to_string()))
    })
}
