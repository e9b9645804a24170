//! Market report generation
//!
//! Both report kinds drive the prediction service across the fixed district
//! list, aggregate the rows, and render a self-contained HTML artifact. The
//! artifact is buffered fully in memory and written through a temp-file
//! rename, so an abort mid-generation never leaves a partial report on disk.

use crate::data::{District, PropertyRecord, TypeLabel};
use crate::engine::{PredictionError, PredictionService};
use crate::report::html;
use chrono::Local;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Area used to derive price-per-square-meter in budget reports
const REFERENCE_AREA: f64 = 100.0;
/// Room-count heuristic: one room class per 50 m²
const SQM_PER_ROOM: f64 = 50.0;

/// Errors raised while generating a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("failed to write report at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One row of the price-by-district report
#[derive(Debug, Clone)]
pub struct PriceReportRow {
    pub district: District,
    pub total_price: f64,
    pub price_per_sqm: f64,
}

/// One row of the max-affordable-area report
#[derive(Debug, Clone)]
pub struct BudgetReportRow {
    pub district: District,
    pub max_area: f64,
    pub max_rooms: u32,
    pub price_per_sqm: f64,
}

/// Aggregate statistics over a report's primary metric
#[derive(Debug, Clone, Copy)]
pub struct ReportStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl ReportStats {
    /// Compute mean/max/min over a non-empty value list
    pub fn over(values: &[f64]) -> Self {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        Self { mean, max, min }
    }
}

/// Generates district market reports through the prediction service
#[derive(Debug)]
pub struct ReportGenerator {
    service: Arc<PredictionService>,
    reports_dir: PathBuf,
}

impl ReportGenerator {
    /// Create a generator writing under the given reports directory
    pub fn new(service: Arc<PredictionService>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            reports_dir: reports_dir.into(),
        }
    }

    /// Predicted-price report for a fixed area and property type
    ///
    /// One prediction per district, rows sorted descending by total price.
    pub async fn generate_price_report(
        &self,
        area: f64,
        type_label: TypeLabel,
    ) -> Result<PathBuf, ReportError> {
        if area == 0.0 {
            return Err(ReportError::DivisionByZero("report area"));
        }

        let mut rows = Vec::with_capacity(District::ALL.len());
        for district in District::ALL {
            let record = record_for(area, district, type_label)?;
            let total_price = self.service.predict_price(&record).await?;
            rows.push(PriceReportRow {
                district,
                total_price,
                price_per_sqm: total_price / area,
            });
        }

        rows.sort_by(|a, b| {
            b.total_price
                .partial_cmp(&a.total_price)
                .unwrap_or(Ordering::Equal)
        });
        let stats = ReportStats::over(&rows.iter().map(|r| r.total_price).collect::<Vec<_>>());

        let generated_at = Local::now();
        let file_name = format!(
            "price_report_{}_{}_{}.html",
            type_label,
            fmt_num(area),
            generated_at.format("%Y%m%d")
        );
        let body = html::render_price_report(&rows, stats, type_label, area, generated_at);
        let path = self.write_report(&file_name, &body)?;

        info!(path = %path.display(), "price report generated");
        Ok(path)
    }

    /// Max-affordable-area report for a fixed budget and property type
    ///
    /// Price-per-square-meter is derived from a reference-area prediction;
    /// rows are sorted descending by affordable area.
    pub async fn generate_budget_report(
        &self,
        max_budget: f64,
        type_label: TypeLabel,
    ) -> Result<PathBuf, ReportError> {
        let mut rows = Vec::with_capacity(District::ALL.len());
        for district in District::ALL {
            let record = record_for(REFERENCE_AREA, district, type_label)?;
            let reference_price = self.service.predict_price(&record).await?;
            let price_per_sqm = reference_price / REFERENCE_AREA;
            if price_per_sqm == 0.0 {
                return Err(ReportError::DivisionByZero("price per square meter"));
            }

            let max_area = max_budget / price_per_sqm;
            rows.push(BudgetReportRow {
                district,
                max_area,
                max_rooms: (max_area / SQM_PER_ROOM).floor() as u32,
                price_per_sqm,
            });
        }

        rows.sort_by(|a, b| b.max_area.partial_cmp(&a.max_area).unwrap_or(Ordering::Equal));
        let stats = ReportStats::over(&rows.iter().map(|r| r.max_area).collect::<Vec<_>>());

        let generated_at = Local::now();
        let file_name = format!(
            "budget_report_{}_{}_{}.html",
            type_label,
            fmt_num(max_budget),
            generated_at.format("%Y%m%d")
        );
        let body = html::render_budget_report(&rows, stats, type_label, max_budget, generated_at);
        let path = self.write_report(&file_name, &body)?;

        info!(path = %path.display(), "budget report generated");
        Ok(path)
    }

    /// Write the fully rendered artifact through a temp file and rename
    fn write_report(&self, file_name: &str, body: &str) -> Result<PathBuf, ReportError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ReportError::Io { path, source }
        };

        std::fs::create_dir_all(&self.reports_dir).map_err(io_err(&self.reports_dir))?;

        let path = self.reports_dir.join(file_name);
        let tmp_path = path.with_extension("html.tmp");
        std::fs::write(&tmp_path, body).map_err(io_err(&tmp_path))?;
        std::fs::rename(&tmp_path, &path).map_err(io_err(&path))?;

        Ok(path)
    }
}

fn record_for(
    area: f64,
    district: District,
    type_label: TypeLabel,
) -> Result<PropertyRecord, PredictionError> {
    PropertyRecord::new(area, district, type_label)
        .map_err(|_| PredictionError::InvalidArea(area))
}

/// Format a numeric report parameter the way it appears in filenames
/// (no trailing ".0" for whole values)
pub(crate) fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
