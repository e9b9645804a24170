//! Training pipeline for the pricing model
//!
//! The trainer splits the labeled dataset 80/20 with a fixed seed, encodes the
//! training rows, fits the boosted-tree regressor and scores the held-out 20%
//! so every training run reports real generalization numbers.

use crate::data::Dataset;
use crate::features::{EncodeError, EncodingScheme, FeatureEncoder};
use crate::models::{GbtParams, GbtRegressor, ModelError, ModelMetrics, PriceModel};
use chrono::Utc;
use thiserror::Error;
use tracing::info;

/// Fraction of rows used for fitting; the rest is scored as hold-out
const TRAIN_RATIO: f64 = 0.8;
/// Smallest dataset the trainer accepts
const MIN_TRAINING_ROWS: usize = 5;

/// Errors raised during training
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("insufficient training data: {0} rows (need at least {MIN_TRAINING_ROWS})")]
    InsufficientData(usize),

    #[error("feature encoding failed")]
    Encoding(#[from] EncodeError),

    #[error("model fit failed")]
    Model(#[from] ModelError),
}

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Rows used for fitting
    pub train_rows: usize,
    /// Rows held out for evaluation
    pub test_rows: usize,
    /// Hold-out metrics; absent when the split left no test rows
    pub holdout: Option<ModelMetrics>,
}

/// Fits pricing models from labeled datasets
#[derive(Debug, Clone)]
pub struct Trainer {
    params: GbtParams,
    split_seed: u64,
}

impl Trainer {
    /// Create a trainer with default hyperparameters
    pub fn new() -> Self {
        Self::with_params(GbtParams::default())
    }

    /// Create a trainer with custom hyperparameters
    pub fn with_params(params: GbtParams) -> Self {
        Self {
            params,
            split_seed: 0,
        }
    }

    /// Fit a model on the dataset and score the hold-out split
    pub fn fit(&self, dataset: &Dataset) -> Result<(PriceModel, TrainingReport), TrainError> {
        if dataset.len() < MIN_TRAINING_ROWS {
            return Err(TrainError::InsufficientData(dataset.len()));
        }

        let (train, test) = dataset.train_test_split(TRAIN_RATIO, self.split_seed);
        info!(
            train_rows = train.len(),
            test_rows = test.len(),
            "training price model"
        );

        let encoder = FeatureEncoder::new(EncodingScheme::full());

        let x_train = encode_all(&encoder, &train)?;
        let regressor = GbtRegressor::fit(&self.params, &x_train, &train.prices)?;

        let holdout = if test.is_empty() {
            None
        } else {
            let x_test = encode_all(&encoder, &test)?;
            let predictions = regressor.predict_batch(&x_test)?;
            let metrics = ModelMetrics::regression(&test.prices, &predictions)?;
            info!(
                mae = metrics.mae,
                rmse = metrics.rmse,
                r2 = metrics.r2,
                "hold-out evaluation"
            );
            Some(metrics)
        };

        let report = TrainingReport {
            train_rows: train.len(),
            test_rows: test.len(),
            holdout,
        };

        let model = PriceModel {
            encoder,
            params: self.params.clone(),
            regressor,
            trained_at: Utc::now(),
        };

        Ok((model, report))
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_all(encoder: &FeatureEncoder, dataset: &Dataset) -> Result<Vec<Vec<f64>>, EncodeError> {
    dataset.records.iter().map(|r| encoder.encode(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{District, PropertyRecord, TypeLabel};

    fn linear_dataset(n: usize) -> Dataset {
        let mut dataset = Dataset::new();
        let label = TypeLabel::new(2).unwrap();
        for i in 0..n {
            let district = District::ALL[i % District::ALL.len()];
            let area = 20.0 + i as f64 * 5.0;
            let record = PropertyRecord::new(area, district, label).unwrap();
            dataset.push(record, area * 1000.0);
        }
        dataset
    }

    #[test]
    fn test_fit_produces_model_and_report() {
        let dataset = linear_dataset(50);
        let (model, report) = Trainer::new().fit(&dataset).unwrap();

        assert_eq!(report.train_rows, 40);
        assert_eq!(report.test_rows, 10);
        assert!(report.holdout.is_some());
        assert_eq!(model.encoder, FeatureEncoder::new(EncodingScheme::full()));
    }

    #[test]
    fn test_fit_rejects_tiny_dataset() {
        let dataset = linear_dataset(3);
        let err = Trainer::new().fit(&dataset).unwrap_err();
        assert!(matches!(err, TrainError::InsufficientData(3)));
    }

    #[test]
    fn test_fit_rejects_empty_dataset() {
        let err = Trainer::new().fit(&Dataset::new()).unwrap_err();
        assert!(matches!(err, TrainError::InsufficientData(0)));
    }

    #[test]
    fn test_holdout_mae_is_reasonable_on_linear_data() {
        let dataset = linear_dataset(80);
        let (_, report) = Trainer::new().fit(&dataset).unwrap();
        let metrics = report.holdout.unwrap();

        // Prices span 20k..415k; a fitted model should be well under 20% mean error
        assert!(metrics.mae < 40_000.0, "mae too high: {}", metrics.mae);
        assert!(metrics.rmse >= metrics.mae * 0.99);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let dataset = linear_dataset(40);
        let trainer = Trainer::new();
        let (a, _) = trainer.fit(&dataset).unwrap();
        let (b, _) = trainer.fit(&dataset).unwrap();

        let record =
            PropertyRecord::new(100.0, District::Lisboa, TypeLabel::new(2).unwrap()).unwrap();
        let row = a.encoder.encode(&record).unwrap();
        assert_eq!(
            a.regressor.predict_one(&row).unwrap(),
            b.regressor.predict_one(&row).unwrap()
        );
    }
}
