//! Core data types for real-estate records
//!
//! This module defines the property record, the fixed district set and the
//! room-class label used throughout the engine.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when constructing or parsing property data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("unknown district: {0}")]
    UnknownDistrict(String),

    #[error("invalid type label: {0} (expected t0..t10)")]
    InvalidTypeLabel(String),

    #[error("area must be a positive finite number, got {0}")]
    NonPositiveArea(f64),
}

/// One of the 18 Portuguese districts used as the location signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum District {
    Aveiro,
    Beja,
    Braga,
    Braganca,
    CasteloBranco,
    Coimbra,
    Evora,
    Faro,
    Guarda,
    Leiria,
    Lisboa,
    Portalegre,
    Porto,
    Santarem,
    Setubal,
    VianaDoCastelo,
    VilaReal,
    Viseu,
}

impl District {
    /// All districts in canonical order (the order reports iterate in)
    pub const ALL: [District; 18] = [
        District::Aveiro,
        District::Beja,
        District::Braga,
        District::Braganca,
        District::CasteloBranco,
        District::Coimbra,
        District::Evora,
        District::Faro,
        District::Guarda,
        District::Leiria,
        District::Lisboa,
        District::Portalegre,
        District::Porto,
        District::Santarem,
        District::Setubal,
        District::VianaDoCastelo,
        District::VilaReal,
        District::Viseu,
    ];

    /// Display name, matching the dataset spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            District::Aveiro => "Aveiro",
            District::Beja => "Beja",
            District::Braga => "Braga",
            District::Braganca => "Bragança",
            District::CasteloBranco => "Castelo Branco",
            District::Coimbra => "Coimbra",
            District::Evora => "Évora",
            District::Faro => "Faro",
            District::Guarda => "Guarda",
            District::Leiria => "Leiria",
            District::Lisboa => "Lisboa",
            District::Portalegre => "Portalegre",
            District::Porto => "Porto",
            District::Santarem => "Santarém",
            District::Setubal => "Setúbal",
            District::VianaDoCastelo => "Viana do Castelo",
            District::VilaReal => "Vila Real",
            District::Viseu => "Viseu",
        }
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for District {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        District::ALL
            .iter()
            .find(|d| d.as_str() == s.trim())
            .copied()
            .ok_or_else(|| RecordError::UnknownDistrict(s.to_string()))
    }
}

/// Property room-class label, `t0` through `t10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeLabel(u8);

impl TypeLabel {
    /// Create a label from a room-class value
    pub fn new(rooms: u8) -> Result<Self, RecordError> {
        if rooms > 10 {
            return Err(RecordError::InvalidTypeLabel(format!("t{}", rooms)));
        }
        Ok(TypeLabel(rooms))
    }

    /// Room-class value (0..=10)
    pub fn rooms(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl FromStr for TypeLabel {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || RecordError::InvalidTypeLabel(s.to_string());

        let digits = trimmed.strip_prefix('t').ok_or_else(invalid)?;
        // Single digit, or exactly "10"; leading zeros like "t05" are rejected
        let valid_shape = digits.len() == 1 || digits == "10";
        if !valid_shape {
            return Err(invalid());
        }

        let rooms: u8 = digits.parse().map_err(|_| invalid())?;
        TypeLabel::new(rooms).map_err(|_| invalid())
    }
}

/// A single property observation (area, district, room class)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Floor area in square meters
    pub area: f64,
    /// District the property is located in
    pub district: District,
    /// Room-class label
    pub type_label: TypeLabel,
}

impl PropertyRecord {
    /// Create a record, enforcing the area > 0 invariant
    pub fn new(area: f64, district: District, type_label: TypeLabel) -> Result<Self, RecordError> {
        if !area.is_finite() || area <= 0.0 {
            return Err(RecordError::NonPositiveArea(area));
        }
        Ok(Self {
            area,
            district,
            type_label,
        })
    }
}

/// Labeled dataset for training (records plus observed sale prices)
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Property records
    pub records: Vec<PropertyRecord>,
    /// Observed sale price for each record
    pub prices: Vec<f64>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a labeled row
    pub fn push(&mut self, record: PropertyRecord, price: f64) {
        self.records.push(record);
        self.prices.push(price);
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split into train and test sets after a seeded shuffle
    ///
    /// The same seed always produces the same split, so training runs are
    /// reproducible.
    pub fn train_test_split(&self, train_ratio: f64, seed: u64) -> (Dataset, Dataset) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let split_idx = (self.len() as f64 * train_ratio) as usize;

        let mut train = Dataset::new();
        let mut test = Dataset::new();
        for (pos, &i) in indices.iter().enumerate() {
            if pos < split_idx {
                train.push(self.records[i].clone(), self.prices[i]);
            } else {
                test.push(self.records[i].clone(), self.prices[i]);
            }
        }

        (train, test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_roundtrip() {
        for district in District::ALL {
            let parsed: District = district.as_str().parse().unwrap();
            assert_eq!(parsed, district);
        }
        assert_eq!(District::ALL.len(), 18);
    }

    #[test]
    fn test_district_unknown() {
        let err = "Madrid".parse::<District>().unwrap_err();
        assert!(matches!(err, RecordError::UnknownDistrict(_)));
    }

    #[test]
    fn test_district_accented_names() {
        assert_eq!("Bragança".parse::<District>().unwrap(), District::Braganca);
        assert_eq!("Évora".parse::<District>().unwrap(), District::Evora);
        assert_eq!(
            "Viana do Castelo".parse::<District>().unwrap(),
            District::VianaDoCastelo
        );
    }

    #[test]
    fn test_type_label_valid() {
        assert_eq!("t0".parse::<TypeLabel>().unwrap().rooms(), 0);
        assert_eq!("t9".parse::<TypeLabel>().unwrap().rooms(), 9);
        assert_eq!("t10".parse::<TypeLabel>().unwrap().rooms(), 10);
    }

    #[test]
    fn test_type_label_invalid() {
        for bad in ["t11", "x2", "t", "t05", "2", "t-1"] {
            assert!(bad.parse::<TypeLabel>().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_record_rejects_non_positive_area() {
        let label = TypeLabel::new(2).unwrap();
        assert!(PropertyRecord::new(0.0, District::Lisboa, label).is_err());
        assert!(PropertyRecord::new(-10.0, District::Lisboa, label).is_err());
        assert!(PropertyRecord::new(f64::NAN, District::Lisboa, label).is_err());
        assert!(PropertyRecord::new(85.0, District::Lisboa, label).is_ok());
    }

    fn sample_dataset(n: usize) -> Dataset {
        let mut dataset = Dataset::new();
        let label = TypeLabel::new(2).unwrap();
        for i in 0..n {
            let district = District::ALL[i % District::ALL.len()];
            let area = 50.0 + i as f64;
            let record = PropertyRecord::new(area, district, label).unwrap();
            dataset.push(record, area * 1000.0);
        }
        dataset
    }

    #[test]
    fn test_train_test_split_sizes() {
        let dataset = sample_dataset(100);
        let (train, test) = dataset.train_test_split(0.8, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
    }

    #[test]
    fn test_train_test_split_deterministic() {
        let dataset = sample_dataset(50);
        let (a_train, _) = dataset.train_test_split(0.8, 7);
        let (b_train, _) = dataset.train_test_split(0.8, 7);
        assert_eq!(a_train.records, b_train.records);
        assert_eq!(a_train.prices, b_train.prices);
    }
}
