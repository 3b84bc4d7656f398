//! Probability normalization
//!
//! Upstream models emit home/draw/away triples either as fractions (0-1)
//! or as percentages (0-100). Every triple is brought onto the fraction
//! scale and rescaled so it sums to exactly 1.

use crate::config::ProbabilityScale;
use crate::types::Triple;
use thiserror::Error;

/// Reasons a raw triple cannot be normalized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("probability triple contains a non-finite value")]
    NonFinite,

    #[error("probability triple contains a negative value")]
    Negative,

    #[error("probability triple sums to zero")]
    ZeroSum,
}

/// A triple on the fraction scale summing to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub probabilities: Triple,
    /// Whether the raw values were read as percentages
    pub from_percent: bool,
    /// Sum before rescaling, in percentage points
    pub raw_sum_pct: f64,
    /// `raw_sum_pct` drifted from 100 by more than the tolerance
    pub out_of_tolerance: bool,
}

impl Normalized {
    /// Signed drift of the raw sum from 100, in percentage points
    pub fn drift_pct(&self) -> f64 {
        self.raw_sum_pct - 100.0
    }
}

#[derive(Debug, Clone)]
pub struct ProbabilityNormalizer {
    scale: ProbabilityScale,
    sum_tolerance_pct: f64,
}

impl ProbabilityNormalizer {
    pub fn new(scale: ProbabilityScale, sum_tolerance_pct: f64) -> Self {
        Self {
            scale,
            sum_tolerance_pct,
        }
    }

    fn is_percent(&self, raw: &Triple) -> bool {
        match self.scale {
            ProbabilityScale::Percent => true,
            ProbabilityScale::Fraction => false,
            ProbabilityScale::Auto => raw.as_array().iter().any(|v| *v > 1.0),
        }
    }

    pub fn normalize(&self, raw: &Triple) -> Result<Normalized, NormalizeError> {
        let values = raw.as_array();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(NormalizeError::NonFinite);
        }
        if values.iter().any(|v| *v < 0.0) {
            return Err(NormalizeError::Negative);
        }

        let from_percent = self.is_percent(raw);
        let fractions = if from_percent { raw.scaled(0.01) } else { *raw };

        let sum = fractions.sum();
        if sum <= 0.0 {
            return Err(NormalizeError::ZeroSum);
        }

        let raw_sum_pct = sum * 100.0;
        let drift = (raw_sum_pct - 100.0).abs();
        let out_of_tolerance = drift > self.sum_tolerance_pct;

        if out_of_tolerance {
            tracing::warn!(
                sum_pct = raw_sum_pct,
                "Probability triple off by {:.2}pp, rescaling",
                drift
            );
        } else if drift > f64::EPSILON {
            tracing::info!(sum_pct = raw_sum_pct, "Rescaling probability triple");
        }

        Ok(Normalized {
            probabilities: fractions.scaled(1.0 / sum),
            from_percent,
            raw_sum_pct,
            out_of_tolerance,
        })
    }
}

impl Default for ProbabilityNormalizer {
    fn default() -> Self {
        Self::new(ProbabilityScale::Auto, 5.0)
    }
}
