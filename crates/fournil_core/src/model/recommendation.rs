//! Production recommendations emitted by the external forecast service.
//!
//! Core never computes these; it only decodes and validates them for display.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_CONFIDENCE_LEVEL: u8 = 100;

/// Recommended production for one product on the next day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub product_name: String,
    /// Quantity for a normal day.
    pub quantity_standard: u32,
    /// Lower quantity that limits unsold leftovers.
    pub quantity_prudent: u32,
    /// Percentage in `0..=100`.
    pub confidence_level: u8,
    pub weather_condition: String,
    pub explanation: String,
}

impl Recommendation {
    pub fn validate(&self) -> Result<(), RecommendationError> {
        if self.confidence_level > MAX_CONFIDENCE_LEVEL {
            return Err(RecommendationError::ConfidenceOutOfRange {
                product_name: self.product_name.clone(),
                value: self.confidence_level,
            });
        }
        Ok(())
    }
}

/// Envelope returned by the forecast service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationBatch {
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationBatch {
    /// Validates every entry, failing on the first invalid one.
    pub fn validate(&self) -> Result<(), RecommendationError> {
        self.recommendations
            .iter()
            .try_for_each(Recommendation::validate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    ConfidenceOutOfRange { product_name: String, value: u8 },
}

impl Display for RecommendationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfidenceOutOfRange {
                product_name,
                value,
            } => write!(
                f,
                "confidence level {value} for `{product_name}` exceeds {MAX_CONFIDENCE_LEVEL}"
            ),
        }
    }
}

impl Error for RecommendationError {}
