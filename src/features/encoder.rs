//! Feature encoding for property records
//!
//! Encoding must be identical at train time and prediction time: a model fit
//! on one feature layout silently produces garbage if the prediction-time
//! encoder diverges. The [`EncodingScheme`] is therefore serialized into the
//! model artifact and reloaded with it, so the two can never drift apart.

use crate::data::{District, PropertyRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while encoding a record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("district {0} is not part of the encoding scheme")]
    UnrecognizedDistrict(District),
}

/// Serializable description of the feature layout
///
/// Feature order is: area, room class, then one slot per district in the
/// order stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingScheme {
    districts: Vec<District>,
}

impl EncodingScheme {
    /// The scheme covering the full canonical district set
    pub fn full() -> Self {
        Self {
            districts: District::ALL.to_vec(),
        }
    }

    /// Number of values a feature vector holds under this scheme
    pub fn feature_len(&self) -> usize {
        2 + self.districts.len()
    }
}

/// Deterministic encoder from property records to numeric feature vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    scheme: EncodingScheme,
}

impl FeatureEncoder {
    /// Create an encoder for a given scheme
    pub fn new(scheme: EncodingScheme) -> Self {
        Self { scheme }
    }

    /// The scheme this encoder applies
    pub fn scheme(&self) -> &EncodingScheme {
        &self.scheme
    }

    /// Feature names in encoding order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec!["area".to_string(), "rooms".to_string()];
        for district in &self.scheme.districts {
            names.push(format!("district_{}", district.as_str().replace(' ', "_")));
        }
        names
    }

    /// Encode a record into a numeric feature vector
    ///
    /// Fails if the record's district has no slot in the scheme, which can
    /// only happen when predicting with an artifact whose scheme predates the
    /// district.
    pub fn encode(&self, record: &PropertyRecord) -> Result<Vec<f64>, EncodeError> {
        let slot = self
            .scheme
            .districts
            .iter()
            .position(|d| *d == record.district)
            .ok_or(EncodeError::UnrecognizedDistrict(record.district))?;

        let mut features = Vec::with_capacity(self.scheme.feature_len());
        features.push(record.area);
        features.push(record.type_label.rooms() as f64);
        for i in 0..self.scheme.districts.len() {
            features.push(if i == slot { 1.0 } else { 0.0 });
        }

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TypeLabel;

    fn record(area: f64, district: District, rooms: u8) -> PropertyRecord {
        PropertyRecord::new(area, district, TypeLabel::new(rooms).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let encoder = FeatureEncoder::new(EncodingScheme::full());
        let features = encoder.encode(&record(85.0, District::Lisboa, 2)).unwrap();

        assert_eq!(features.len(), encoder.scheme().feature_len());
        assert_eq!(features[0], 85.0);
        assert_eq!(features[1], 2.0);

        // Exactly one hot district slot, at Lisboa's canonical position
        let one_hot = &features[2..];
        assert_eq!(one_hot.iter().sum::<f64>(), 1.0);
        let lisboa_idx = District::ALL.iter().position(|d| *d == District::Lisboa).unwrap();
        assert_eq!(one_hot[lisboa_idx], 1.0);
    }

    #[test]
    fn test_encode_deterministic() {
        let encoder = FeatureEncoder::new(EncodingScheme::full());
        let r = record(120.0, District::Faro, 3);
        assert_eq!(encoder.encode(&r).unwrap(), encoder.encode(&r).unwrap());
    }

    #[test]
    fn test_encode_distinct_districts_differ() {
        let encoder = FeatureEncoder::new(EncodingScheme::full());
        let a = encoder.encode(&record(85.0, District::Porto, 2)).unwrap();
        let b = encoder.encode(&record(85.0, District::Beja, 2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_encode_unknown_district_in_scheme() {
        // A scheme missing Viseu, as an artifact from an older deployment might carry
        let scheme = EncodingScheme {
            districts: District::ALL[..17].to_vec(),
        };
        let encoder = FeatureEncoder::new(scheme);
        let err = encoder.encode(&record(85.0, District::Viseu, 2)).unwrap_err();
        assert_eq!(err, EncodeError::UnrecognizedDistrict(District::Viseu));
    }

    #[test]
    fn test_feature_names_match_len() {
        let encoder = FeatureEncoder::new(EncodingScheme::full());
        assert_eq!(encoder.feature_names().len(), encoder.scheme().feature_len());
        assert_eq!(encoder.feature_names()[0], "area");
    }
}
