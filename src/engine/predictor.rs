//! Prediction service over the loaded model
//!
//! The service starts unloaded and rejects queries until a model is installed
//! (from a fresh fit or a store load). Concurrent predictions share one
//! immutable model behind an `Arc`; a reload swaps the reference under a write
//! lock, so an in-flight prediction keeps the model it started with and never
//! observes a torn swap.

use crate::data::{PropertyRecord, RecordError};
use crate::features::EncodeError;
use crate::models::{ModelError, PriceModel};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Errors raised by the prediction service
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("no model is loaded")]
    ModelNotLoaded,

    #[error("unrecognized district: {0}")]
    UnrecognizedCategory(String),

    #[error("invalid property type label: {0}")]
    InvalidTypeLabel(String),

    #[error("invalid area: {0}")]
    InvalidArea(f64),

    #[error(transparent)]
    Encoding(#[from] EncodeError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("inference task failed: {0}")]
    Inference(String),
}

/// Thread-safe price prediction over a single loaded model
#[derive(Debug, Default)]
pub struct PredictionService {
    model: RwLock<Option<Arc<PriceModel>>>,
}

impl PredictionService {
    /// Create an unloaded service
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a model, moving the service to the loaded state
    ///
    /// Predictions already running continue against the model they captured.
    pub async fn install(&self, model: PriceModel) {
        let mut guard = self.model.write().await;
        *guard = Some(Arc::new(model));
    }

    /// Answer whether a model is currently usable
    pub async fn is_loaded(&self) -> bool {
        self.model.read().await.is_some()
    }

    /// Predict the sale price for a property record
    ///
    /// Inference runs on a blocking worker so concurrent predictions do not
    /// serialize behind the caller's task. Negative regressor outputs are
    /// clamped to zero.
    pub async fn predict_price(&self, record: &PropertyRecord) -> Result<f64, PredictionError> {
        let model = self
            .model
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(PredictionError::ModelNotLoaded)?;

        let features = model.encoder.encode(record)?;
        let price = tokio::task::spawn_blocking(move || model.regressor.predict_one(&features))
            .await
            .map_err(|e| PredictionError::Inference(e.to_string()))??;

        debug!(?record, price, "prediction served");
        Ok(price.max(0.0))
    }

    /// Predict from raw string inputs, the boundary the presentation layer calls
    pub async fn predict_price_for(
        &self,
        area: f64,
        district: &str,
        type_label: &str,
    ) -> Result<f64, PredictionError> {
        let record = parse_record(area, district, type_label)?;
        self.predict_price(&record).await
    }
}

/// Parse raw inputs into a validated record
pub fn parse_record(
    area: f64,
    district: &str,
    type_label: &str,
) -> Result<PropertyRecord, PredictionError> {
    let district = district
        .parse()
        .map_err(|_| PredictionError::UnrecognizedCategory(district.to_string()))?;
    let type_label = type_label
        .parse()
        .map_err(|_| PredictionError::InvalidTypeLabel(type_label.to_string()))?;

    PropertyRecord::new(area, district, type_label).map_err(|e| match e {
        RecordError::NonPositiveArea(a) => PredictionError::InvalidArea(a),
        RecordError::UnknownDistrict(d) => PredictionError::UnrecognizedCategory(d),
        RecordError::InvalidTypeLabel(t) => PredictionError::InvalidTypeLabel(t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, District, TypeLabel};
    use crate::engine::trainer::Trainer;

    fn dataset_with_price(price_per_sqm: f64) -> Dataset {
        let mut dataset = Dataset::new();
        let label = TypeLabel::new(2).unwrap();
        for i in 0..60 {
            let district = District::ALL[i % District::ALL.len()];
            let area = 20.0 + i as f64 * 5.0;
            let record = PropertyRecord::new(area, district, label).unwrap();
            dataset.push(record, area * price_per_sqm);
        }
        dataset
    }

    async fn loaded_service(price_per_sqm: f64) -> PredictionService {
        let (model, _) = Trainer::new().fit(&dataset_with_price(price_per_sqm)).unwrap();
        let service = PredictionService::new();
        service.install(model).await;
        service
    }

    #[tokio::test]
    async fn test_unloaded_service_rejects_predictions() {
        let service = PredictionService::new();
        assert!(!service.is_loaded().await);

        let err = service.predict_price_for(100.0, "Lisboa", "t2").await.unwrap_err();
        assert!(matches!(err, PredictionError::ModelNotLoaded));
    }

    #[tokio::test]
    async fn test_prediction_is_finite_and_non_negative() {
        let service = loaded_service(1000.0).await;
        assert!(service.is_loaded().await);

        for district in District::ALL {
            let price = service
                .predict_price_for(100.0, district.as_str(), "t2")
                .await
                .unwrap();
            assert!(price.is_finite());
            assert!(price >= 0.0);
        }
    }

    #[tokio::test]
    async fn test_prediction_idempotent() {
        let service = loaded_service(1000.0).await;
        let a = service.predict_price_for(85.0, "Porto", "t3").await.unwrap();
        let b = service.predict_price_for(85.0, "Porto", "t3").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_negative_outputs_are_clamped() {
        // A model fit on negative prices predicts negative values; the service
        // must clamp them to zero.
        let service = loaded_service(-1000.0).await;
        let price = service.predict_price_for(100.0, "Lisboa", "t2").await.unwrap();
        assert_eq!(price, 0.0);
    }

    #[tokio::test]
    async fn test_bad_inputs_rejected_at_boundary() {
        let service = loaded_service(1000.0).await;

        let err = service.predict_price_for(100.0, "Narnia", "t2").await.unwrap_err();
        assert!(matches!(err, PredictionError::UnrecognizedCategory(_)));

        let err = service.predict_price_for(100.0, "Lisboa", "t42").await.unwrap_err();
        assert!(matches!(err, PredictionError::InvalidTypeLabel(_)));

        let err = service.predict_price_for(-3.0, "Lisboa", "t2").await.unwrap_err();
        assert!(matches!(err, PredictionError::InvalidArea(_)));
    }

    #[tokio::test]
    async fn test_concurrent_predictions_share_one_model() {
        let service = Arc::new(loaded_service(1000.0).await);

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let area = 50.0 + i as f64 * 10.0;
                service.predict_price_for(area, "Braga", "t2").await
            }));
        }

        for handle in handles {
            let price = handle.await.unwrap().unwrap();
            assert!(price.is_finite() && price >= 0.0);
        }
    }
}
