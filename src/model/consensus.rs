//! Ensemble consensus across model predictions

use crate::types::{Outcome, Triple};
use serde::{Deserialize, Serialize};

/// Number of models the plurality vote is defined for
pub const CANONICAL_ENSEMBLE_SIZE: usize = 3;

/// How the consensus triple was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsensusStrategy {
    SingleModel,
    PluralityEnsemble,
    PartialEnsemble,
}

/// Strength of the consensus pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    Strong,
    Moderate,
    Weak,
}

impl ConfidenceLabel {
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.60 {
            ConfidenceLabel::Strong
        } else if p >= 0.45 {
            ConfidenceLabel::Moderate
        } else {
            ConfidenceLabel::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusPrediction {
    /// Final triple, sums to 1
    pub probabilities: Triple,
    /// Combined values before the final rescale
    pub blend: Triple,
    pub predicted: Outcome,
    pub confidence: ConfidenceLabel,
    pub model_count: usize,
    /// Share of models whose own pick matches `predicted`
    pub consensus_ratio: f64,
    /// Mean per-outcome variance across models
    pub variance: f64,
    pub strategy: ConsensusStrategy,
}

/// Resolves normalized per-model triples into one consensus
#[derive(Debug, Clone, Default)]
pub struct EnsembleConsensusResolver;

impl EnsembleConsensusResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when there are no models to combine
    pub fn resolve(&self, models: &[Triple]) -> Option<ConsensusPrediction> {
        match models.len() {
            0 => None,
            1 => {
                let only = models[0];
                Some(self.build(models, only, only.argmax(), ConsensusStrategy::SingleModel))
            }
            CANONICAL_ENSEMBLE_SIZE => self
                .plurality(models)
                .or_else(|| Some(self.most_confident(models))),
            _ => Some(self.most_confident(models)),
        }
    }

    /// `None` when no outcome has at least two votes
    fn plurality(&self, models: &[Triple]) -> Option<ConsensusPrediction> {
        let votes: Vec<Outcome> = models.iter().map(Triple::argmax).collect();

        let mut majority = Outcome::Home;
        let mut best_count = 0;
        for outcome in Outcome::ALL {
            let count = votes.iter().filter(|v| **v == outcome).count();
            if count > best_count {
                majority = outcome;
                best_count = count;
            }
        }

        if best_count < 2 {
            tracing::debug!("Split vote across {} models, no majority", models.len());
            return None;
        }

        let n = models.len() as f64;
        let mut blend = Triple::new(0.0, 0.0, 0.0);
        for outcome in Outcome::ALL {
            let value = if outcome == majority {
                models
                    .iter()
                    .zip(&votes)
                    .filter(|(_, vote)| **vote == majority)
                    .map(|(m, _)| m.get(outcome))
                    .fold(f64::MIN, f64::max)
            } else {
                models.iter().map(|m| m.get(outcome)).sum::<f64>() / n
            };
            blend.set(outcome, value);
        }

        tracing::debug!(
            majority = %majority,
            votes = best_count,
            "Plurality vote across {} models",
            models.len()
        );

        Some(self.build(models, blend, majority, ConsensusStrategy::PluralityEnsemble))
    }

    fn most_confident(&self, models: &[Triple]) -> ConsensusPrediction {
        let mut best = models[0];
        for model in &models[1..] {
            if model.max_value() > best.max_value() {
                best = *model;
            }
        }

        tracing::debug!("Using most confident of {} models", models.len());

        self.build(models, best, best.argmax(), ConsensusStrategy::PartialEnsemble)
    }

    fn build(
        &self,
        models: &[Triple],
        blend: Triple,
        predicted: Outcome,
        strategy: ConsensusStrategy,
    ) -> ConsensusPrediction {
        let sum = blend.sum();
        let probabilities = if sum > 0.0 { blend.scaled(1.0 / sum) } else { blend };

        let agreeing = models.iter().filter(|m| m.argmax() == predicted).count();

        ConsensusPrediction {
            probabilities,
            blend,
            predicted,
            confidence: ConfidenceLabel::from_probability(probabilities.get(predicted)),
            model_count: models.len(),
            consensus_ratio: agreeing as f64 / models.len() as f64,
            variance: mean_outcome_variance(models),
            strategy,
        }
    }
}

/// Population variance of each outcome across models, averaged over outcomes
pub fn mean_outcome_variance(models: &[Triple]) -> f64 {
    if models.is_empty() {
        return 0.0;
    }
    let n = models.len() as f64;
    let total: f64 = Outcome::ALL
        .iter()
        .map(|outcome| {
            let mean = models.iter().map(|m| m.get(*outcome)).sum::<f64>() / n;
            models
                .iter()
                .map(|m| (m.get(*outcome) - mean).powi(2))
                .sum::<f64>()
                / n
        })
        .sum();
    total / Outcome::ALL.len() as f64
}
