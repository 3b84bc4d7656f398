//! Prediction models
//!
//! Turns raw per-model probability triples into a single consensus:
//! - [`ProbabilityNormalizer`] reconciles percentage vs fraction encodings
//! - [`EnsembleConsensusResolver`] merges the normalized triples

mod consensus;
mod normalizer;

pub use consensus::{
    mean_outcome_variance, ConfidenceLabel, ConsensusPrediction, ConsensusStrategy,
    EnsembleConsensusResolver, CANONICAL_ENSEMBLE_SIZE,
};
pub use normalizer::{NormalizeError, Normalized, ProbabilityNormalizer};

use crate::types::{ModelPrediction, Triple};

/// Outcome of running every model prediction through the normalizer
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub triples: Vec<Triple>,
    /// Non-fatal data quality notes (rescaled or skipped models)
    pub warnings: Vec<String>,
}

/// Normalize every model prediction, skipping the ones that cannot be used
pub fn normalize_all(
    normalizer: &ProbabilityNormalizer,
    predictions: &[ModelPrediction],
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for prediction in predictions {
        match normalizer.normalize(&prediction.raw) {
            Ok(normalized) => {
                if normalized.out_of_tolerance {
                    let scale = if normalized.from_percent { "percent" } else { "fraction" };
                    batch.warnings.push(format!(
                        "model {} {} probabilities summed to {:.1}% ({:+.1}pp), rescaled to 100%",
                        prediction.source,
                        scale,
                        normalized.raw_sum_pct,
                        normalized.drift_pct()
                    ));
                }
                batch.triples.push(normalized.probabilities);
            }
            Err(e) => {
                tracing::warn!(source = %prediction.source, "Skipping model prediction: {}", e);
                batch
                    .warnings
                    .push(format!("model {} skipped: {}", prediction.source, e));
            }
        }
    }

    batch
}
