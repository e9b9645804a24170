//! Gradient-boosted regression trees
//!
//! The learner boosts smartcore decision trees on residuals: the base
//! prediction is the mean target, and each round fits a shallow tree to the
//! remaining residuals and shrinks its contribution by the learning rate.
//! Fitting with the same parameters, data and seed is fully reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use thiserror::Error;
use tracing::info;

type BaseTree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Errors that can occur with the model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("training failed: {0}")]
    TrainingFailed(String),

    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbtParams {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: u16,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples required in a leaf node
    pub min_samples_leaf: usize,
    /// Row subsample ratio per boosting round
    pub subsample: f64,
    /// Seed for the subsampling RNG
    pub seed: u64,
}

impl Default for GbtParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 4,
            learning_rate: 0.1,
            min_samples_split: 2,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 0,
        }
    }
}

/// Model evaluation metrics for regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean absolute error
    pub mae: f64,
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// R-squared score
    pub r2: f64,
}

impl ModelMetrics {
    /// Calculate regression metrics over paired observations
    pub fn regression(y_true: &[f64], y_pred: &[f64]) -> Result<Self, ModelError> {
        let n = y_true.len();
        if n == 0 || n != y_pred.len() {
            return Err(ModelError::InvalidData(format!(
                "metric inputs must be equal-length and non-empty (got {} and {})",
                n,
                y_pred.len()
            )));
        }

        let mse: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / n as f64;

        let mae: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).abs())
            .sum::<f64>()
            / n as f64;

        let mean_true: f64 = y_true.iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean_true).powi(2)).sum();
        let ss_res: f64 = n as f64 * mse;
        let r2 = if ss_tot != 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(Self {
            mae,
            mse,
            rmse: mse.sqrt(),
            r2,
        })
    }
}

/// Gradient-boosted trees regressor
#[derive(Debug, Serialize, Deserialize)]
pub struct GbtRegressor {
    params: GbtParams,
    n_features: usize,
    base_prediction: f64,
    trees: Vec<BaseTree>,
}

impl GbtRegressor {
    /// Fit a regressor on a feature matrix and targets
    pub fn fit(
        params: &GbtParams,
        features: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<Self, ModelError> {
        if features.is_empty() {
            return Err(ModelError::InvalidData("empty training set".to_string()));
        }
        if features.len() != targets.len() {
            return Err(ModelError::InvalidData(format!(
                "feature rows ({}) do not match targets ({})",
                features.len(),
                targets.len()
            )));
        }
        let n_features = features[0].len();
        if n_features == 0 || features.iter().any(|row| row.len() != n_features) {
            return Err(ModelError::InvalidData(
                "feature rows must be non-empty and rectangular".to_string(),
            ));
        }

        let n_samples = features.len();
        info!(n_samples, n_features, ?params, "fitting gradient-boosted trees");

        let base_prediction = targets.iter().sum::<f64>() / n_samples as f64;
        let mut residuals: Vec<f64> = targets.iter().map(|t| t - base_prediction).collect();

        let full_matrix = DenseMatrix::from_2d_vec(&features.to_vec())
            .map_err(|e| ModelError::InvalidData(format!("failed to build feature matrix: {e}")))?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let sample_size = ((n_samples as f64 * params.subsample) as usize)
            .clamp(1, n_samples);

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let tree = if sample_size < n_samples {
                let mut indices: Vec<usize> = (0..n_samples).collect();
                indices.shuffle(&mut rng);
                indices.truncate(sample_size);

                let sample_rows: Vec<Vec<f64>> =
                    indices.iter().map(|&i| features[i].clone()).collect();
                let sample_residuals: Vec<f64> = indices.iter().map(|&i| residuals[i]).collect();

                Self::fit_tree(params, &sample_rows, &sample_residuals)?
            } else {
                Self::fit_tree(params, features, &residuals)?
            };

            // Update residuals over the full training set
            let round_predictions = tree
                .predict(&full_matrix)
                .map_err(|e| ModelError::TrainingFailed(format!("residual update failed: {e}")))?;
            for (residual, predicted) in residuals.iter_mut().zip(round_predictions.iter()) {
                *residual -= params.learning_rate * predicted;
            }

            trees.push(tree);
        }

        Ok(Self {
            params: params.clone(),
            n_features,
            base_prediction,
            trees,
        })
    }

    fn fit_tree(
        params: &GbtParams,
        rows: &[Vec<f64>],
        residuals: &[f64],
    ) -> Result<BaseTree, ModelError> {
        let matrix = DenseMatrix::from_2d_vec(&rows.to_vec())
            .map_err(|e| ModelError::InvalidData(format!("failed to build feature matrix: {e}")))?;

        DecisionTreeRegressor::fit(
            &matrix,
            &residuals.to_vec(),
            DecisionTreeRegressorParameters::default()
                .with_max_depth(params.max_depth)
                .with_min_samples_split(params.min_samples_split)
                .with_min_samples_leaf(params.min_samples_leaf),
        )
        .map_err(|e| ModelError::TrainingFailed(e.to_string()))
    }

    /// Predict targets for a batch of feature vectors
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        if features.iter().any(|row| row.len() != self.n_features) {
            return Err(ModelError::PredictionFailed(format!(
                "expected {} features per row",
                self.n_features
            )));
        }

        let matrix = DenseMatrix::from_2d_vec(&features.to_vec())
            .map_err(|e| ModelError::PredictionFailed(format!("failed to build feature matrix: {e}")))?;

        let mut predictions = vec![self.base_prediction; features.len()];
        for tree in &self.trees {
            let contribution = tree
                .predict(&matrix)
                .map_err(|e| ModelError::PredictionFailed(e.to_string()))?;
            for (total, part) in predictions.iter_mut().zip(contribution.iter()) {
                *total += self.params.learning_rate * part;
            }
        }

        Ok(predictions)
    }

    /// Predict the target for a single feature vector
    pub fn predict_one(&self, features: &[f64]) -> Result<f64, ModelError> {
        let batch = self.predict_batch(&[features.to_vec()])?;
        Ok(batch[0])
    }

    /// Hyperparameters the model was fit with
    pub fn params(&self) -> &GbtParams {
        &self.params
    }

    /// Number of features per input row
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let features: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![10.0 + i as f64 * 5.0, (i % 4) as f64])
            .collect();
        let targets: Vec<f64> = features.iter().map(|row| row[0] * 1000.0).collect();
        (features, targets)
    }

    #[test]
    fn test_fit_and_predict_linear() {
        let (features, targets) = linear_data(60);
        let model = GbtRegressor::fit(&GbtParams::default(), &features, &targets).unwrap();

        let predicted = model.predict_one(&[100.0, 2.0]).unwrap();
        let expected = 100_000.0;
        assert!(
            (predicted - expected).abs() < expected * 0.25,
            "predicted {} too far from {}",
            predicted,
            expected
        );
    }

    #[test]
    fn test_fit_deterministic() {
        let (features, targets) = linear_data(40);
        let params = GbtParams {
            subsample: 0.7,
            ..Default::default()
        };
        let a = GbtRegressor::fit(&params, &features, &targets).unwrap();
        let b = GbtRegressor::fit(&params, &features, &targets).unwrap();

        let row = vec![120.0, 1.0];
        assert_eq!(a.predict_one(&row).unwrap(), b.predict_one(&row).unwrap());
    }

    #[test]
    fn test_fit_rejects_empty() {
        let err = GbtRegressor::fit(&GbtParams::default(), &[], &[]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidData(_)));
    }

    #[test]
    fn test_fit_rejects_mismatched_lengths() {
        let err =
            GbtRegressor::fit(&GbtParams::default(), &[vec![1.0], vec![2.0]], &[1.0]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidData(_)));
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (features, targets) = linear_data(20);
        let model = GbtRegressor::fit(&GbtParams::default(), &features, &targets).unwrap();
        let err = model.predict_one(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ModelError::PredictionFailed(_)));
    }

    #[test]
    fn test_metrics_known_values() {
        let metrics = ModelMetrics::regression(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]).unwrap();
        assert!((metrics.mae - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.mse - 4.0 / 3.0).abs() < 1e-12);
        assert!((metrics.rmse - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(metrics.r2 < 1.0);
    }

    #[test]
    fn test_metrics_reject_mismatch() {
        assert!(ModelMetrics::regression(&[1.0], &[]).is_err());
        assert!(ModelMetrics::regression(&[], &[]).is_err());
    }

    #[test]
    fn test_serde_roundtrip_preserves_predictions() {
        let (features, targets) = linear_data(30);
        let model = GbtRegressor::fit(&GbtParams::default(), &features, &targets).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: GbtRegressor = serde_json::from_str(&json).unwrap();

        let row = vec![75.0, 3.0];
        assert_eq!(
            model.predict_one(&row).unwrap(),
            restored.predict_one(&row).unwrap()
        );
    }
}
