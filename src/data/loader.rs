//! CSV loading for the training dataset
//!
//! The input file is comma-separated with a header row. Column order follows
//! the scraped-listings layout: column 0 is an unused index, column 1 the type
//! label, column 2 the price, column 3 the area and column 4 the district.
//! Rows that fail validation are skipped with a warning rather than aborting
//! the whole load, since scraped data routinely contains noise.

use crate::data::types::{Dataset, District, PropertyRecord, TypeLabel};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Column positions in the input file
const COL_TYPE_LABEL: usize = 1;
const COL_PRICE: usize = 2;
const COL_AREA: usize = 3;
const COL_DISTRICT: usize = 4;

/// Errors raised while loading the training dataset
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to open dataset {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read csv record")]
    Csv(#[from] csv::Error),

    #[error("dataset {0} contained no usable rows")]
    Empty(PathBuf),
}

/// Load and validate the labeled dataset from a CSV file
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let mut dataset = Dataset::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;
        match parse_row(&record) {
            Some((property, price)) => dataset.push(property, price),
            None => {
                skipped += 1;
                warn!(row = ?record, "skipping unparseable dataset row");
            }
        }
    }

    if dataset.is_empty() {
        return Err(DataError::Empty(path.to_path_buf()));
    }

    info!(
        rows = dataset.len(),
        skipped,
        path = %path.display(),
        "loaded training dataset"
    );

    Ok(dataset)
}

fn parse_row(record: &csv::StringRecord) -> Option<(PropertyRecord, f64)> {
    let type_label: TypeLabel = record.get(COL_TYPE_LABEL)?.parse().ok()?;
    let price: f64 = record.get(COL_PRICE)?.trim().parse().ok()?;
    let area: f64 = record.get(COL_AREA)?.trim().parse().ok()?;
    let district: District = record.get(COL_DISTRICT)?.parse().ok()?;

    if !price.is_finite() || price <= 0.0 {
        return None;
    }

    let property = PropertyRecord::new(area, district, type_label).ok()?;
    Some((property, price))
}
