//! Expected value strategy
//!
//! EV per outcome = probability × decimal odds − 1, reported in percent.
//! A best bet is only recommended when some outcome has strictly positive EV.


use crate::config::EngineConfig;
use crate::odds::OddsTriple;
use crate::types::{Outcome, Triple};
use serde::{Deserialize, Serialize};

/// EV analysis for one fixture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedValue {
    /// EV in percent, `None` where odds are missing
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
    pub best_bet: Option<Outcome>,
    pub best_ev: Option<f64>,
    /// Outcomes whose EV was replaced by the capped value
    pub capped: Vec<Outcome>,
}

impl ExpectedValue {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    fn set(&mut self, outcome: Outcome, value: f64) {
        match outcome {
            Outcome::Home => self.home = Some(value),
            Outcome::Draw => self.draw = Some(value),
            Outcome::Away => self.away = Some(value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvReport {
    pub expected_value: ExpectedValue,
    pub warnings: Vec<String>,
}

/// Raw EV in percent
pub fn expected_value_pct(probability: f64, odds: f64) -> f64 {
    (probability * odds - 1.0) * 100.0
}

pub struct ExpectedValueCalculator {
    /// EV above this is treated as a data anomaly
    ceiling_pct: f64,
    /// Value reported in place of an anomalous EV
    capped_pct: f64,
}

impl ExpectedValueCalculator {
    pub fn new(ceiling_pct: f64, capped_pct: f64) -> Self {
        Self {
            ceiling_pct,
            capped_pct,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.ev_ceiling_pct, config.ev_capped_pct)
    }

    pub fn calculate(&self, probabilities: &Triple, odds: &OddsTriple) -> EvReport {
        let mut report = EvReport::default();
        let mut best: Option<(Outcome, f64)> = None;

        for outcome in Outcome::ALL {
            let Some(price) = odds.get(outcome) else {
                continue;
            };
            let raw = expected_value_pct(probabilities.get(outcome), price);

            // Rank on the raw value so capped outcomes keep their order
            if raw > 0.0 && best.map_or(true, |(_, b)| raw > b) {
                best = Some((outcome, raw));
            }

            let reported = if raw > self.ceiling_pct {
                tracing::warn!(
                    outcome = %outcome,
                    odds = price,
                    "EV {:.1}% exceeds {:.0}% ceiling, likely a data anomaly; capping at {:.0}%",
                    raw,
                    self.ceiling_pct,
                    self.capped_pct
                );
                report.warnings.push(format!(
                    "{} EV {:.1}% capped at {:.0}%",
                    outcome, raw, self.capped_pct
                ));
                report.expected_value.capped.push(outcome);
                self.capped_pct
            } else {
                raw
            };
            report.expected_value.set(outcome, reported);
        }

        if let Some((outcome, _)) = best {
            report.expected_value.best_bet = Some(outcome);
            report.expected_value.best_ev = report.expected_value.get(outcome);
        }

        report
    }
}

impl Default for ExpectedValueCalculator {
    fn default() -> Self {
        Self::new(100.0, 50.0)
    }
}
