//! Feature engineering for the pricing model

pub mod encoder;

pub use encoder::{EncodeError, EncodingScheme, FeatureEncoder};
