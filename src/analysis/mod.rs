//! Market indicator analysis
//!
//! Derives what the bookmaker prices say about a fixture:
//! - Implied probability per outcome (100 / odds)
//! - Bookmaker margin (overround above 100%)
//! - Market favorite and whether the consensus agrees with it
//! - A coarse liquidity estimate from margin tightness

#[cfg(test)]
mod tests;

use crate::odds::OddsTriple;
use crate::strategy::ExpectedValue;
use crate::types::Outcome;
use serde::{Deserialize, Serialize};

/// Margin below this (pp) suggests a heavily traded market
const HIGH_VOLUME_MARGIN: f64 = 5.0;
/// Margin below this (pp) suggests moderate trading
const MEDIUM_VOLUME_MARGIN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeEstimate {
    High,
    Medium,
    Low,
}

impl VolumeEstimate {
    pub fn from_margin(margin_pct: f64) -> Self {
        if margin_pct < HIGH_VOLUME_MARGIN {
            VolumeEstimate::High
        } else if margin_pct < MEDIUM_VOLUME_MARGIN {
            VolumeEstimate::Medium
        } else {
            VolumeEstimate::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketAgreement {
    Agreement,
    Disagreement,
}

/// Implied probabilities in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpliedProbabilities {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl ImpliedProbabilities {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIndicators {
    pub implied: ImpliedProbabilities,
    /// Sum of implied probabilities minus 100, only with all three prices
    pub margin_pct: Option<f64>,
    pub favorite: Option<Outcome>,
    pub volume: Option<VolumeEstimate>,
    pub agreement: Option<MarketAgreement>,
    /// Consensus disagrees with the market and its pick has positive EV
    pub value_opportunity: bool,
}

/// Implied probability in percent for decimal odds
pub fn implied_probability_pct(odds: f64) -> f64 {
    100.0 / odds
}

#[derive(Debug, Clone, Default)]
pub struct MarketIndicatorAnalyzer;

impl MarketIndicatorAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        odds: &OddsTriple,
        predicted: Option<Outcome>,
        expected_value: Option<&ExpectedValue>,
    ) -> MarketIndicators {
        let implied = ImpliedProbabilities {
            home: odds.home.map(implied_probability_pct),
            draw: odds.draw.map(implied_probability_pct),
            away: odds.away.map(implied_probability_pct),
        };

        let margin_pct = match (implied.home, implied.draw, implied.away) {
            (Some(h), Some(d), Some(a)) => Some(h + d + a - 100.0),
            _ => None,
        };

        let mut favorite: Option<(Outcome, f64)> = None;
        for outcome in Outcome::ALL {
            if let Some(p) = implied.get(outcome) {
                if favorite.map_or(true, |(_, best)| p > best) {
                    favorite = Some((outcome, p));
                }
            }
        }
        let favorite = favorite.map(|(o, _)| o);

        let agreement = match (predicted, favorite) {
            (Some(pick), Some(fav)) if pick == fav => Some(MarketAgreement::Agreement),
            (Some(_), Some(_)) => Some(MarketAgreement::Disagreement),
            _ => None,
        };

        let value_opportunity = agreement == Some(MarketAgreement::Disagreement)
            && predicted
                .and_then(|pick| expected_value.and_then(|ev| ev.get(pick)))
                .is_some_and(|ev| ev > 0.0);

        if value_opportunity {
            tracing::info!(
                predicted = ?predicted,
                favorite = ?favorite,
                "Consensus disagrees with market favorite at positive EV"
            );
        }

        MarketIndicators {
            implied,
            margin_pct,
            favorite,
            volume: margin_pct.map(VolumeEstimate::from_margin),
            agreement,
            value_opportunity,
        }
    }
}
