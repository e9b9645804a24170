//! Persistence of the trained model artifact
//!
//! One filesystem path is authoritative per deployment. Artifacts are loaded
//! and saved whole; saves go through a sibling temp file followed by a rename
//! so a failed save never leaves a half-written artifact that `load` accepts.

use crate::features::FeatureEncoder;
use crate::models::gbm::{GbtParams, GbtRegressor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors raised by the model store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no model artifact at {0}")]
    NotFound(PathBuf),

    #[error("model artifact at {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact i/o failed at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The trained model artifact: regressor plus the encoder it was fit with
///
/// The encoder travels inside the artifact so a reloaded model always applies
/// the exact feature layout it was trained on.
#[derive(Debug, Serialize, Deserialize)]
pub struct PriceModel {
    /// Feature encoder the regressor was fit on
    pub encoder: FeatureEncoder,
    /// Hyperparameters used for the fit
    pub params: GbtParams,
    /// The fitted regressor
    pub regressor: GbtRegressor,
    /// When the fit completed
    pub trained_at: DateTime<Utc>,
}

/// Whole-file load/save of the model artifact
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    /// Create a store bound to an artifact path
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The authoritative artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether an artifact currently exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the artifact whole
    pub fn load(&self) -> Result<PriceModel, StoreError> {
        let file = File::open(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(self.path.clone())
            } else {
                StoreError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let model = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        info!(path = %self.path.display(), "loaded model artifact");
        Ok(model)
    }

    /// Save the artifact, replacing any previous one atomically
    pub fn save(&self, model: &PriceModel) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StoreError::Io { path, source }
        };

        let file = File::create(&tmp_path).map_err(io_err(&tmp_path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, model).map_err(|source| {
            // Leave no stray temp file behind on a failed write
            let _ = std::fs::remove_file(&tmp_path);
            StoreError::Corrupt {
                path: tmp_path.clone(),
                source,
            }
        })?;
        std::io::Write::flush(&mut writer).map_err(io_err(&tmp_path))?;

        std::fs::rename(&tmp_path, &self.path).map_err(io_err(&self.path))?;

        info!(path = %self.path.display(), "saved model artifact");
        Ok(())
    }
}
