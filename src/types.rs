//! Core types shared by the consensus engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full-time result outcome of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// All outcomes in tie-break priority order (home > draw > away)
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Parse a bookmaker outcome label ("Home", "1", "X", "2", ...)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "home" | "1" => Some(Outcome::Home),
            "draw" | "x" | "tie" => Some(Outcome::Draw),
            "away" | "2" => Some(Outcome::Away),
            _ => None,
        }
    }

    /// Position of this outcome within a home/draw/away triple
    pub fn index(self) -> usize {
        match self {
            Outcome::Home => 0,
            Outcome::Draw => 1,
            Outcome::Away => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Home => write!(f, "home"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::Away => write!(f, "away"),
        }
    }
}

/// Home/draw/away probability triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Triple {
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        self.as_array()[outcome.index()]
    }

    pub fn set(&mut self, outcome: Outcome, value: f64) {
        match outcome {
            Outcome::Home => self.home = value,
            Outcome::Draw => self.draw = value,
            Outcome::Away => self.away = value,
        }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.home, self.draw, self.away]
    }

    /// Multiply every component by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.home * factor, self.draw * factor, self.away * factor)
    }

    /// Outcome with the highest value; ties resolve home > draw > away
    pub fn argmax(&self) -> Outcome {
        let mut best = Outcome::Home;
        for outcome in [Outcome::Draw, Outcome::Away] {
            if self.get(outcome) > self.get(best) {
                best = outcome;
            }
        }
        best
    }

    /// Highest component value
    pub fn max_value(&self) -> f64 {
        self.get(self.argmax())
    }
}

/// Fixture identity and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u64,
    pub name: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub kickoff: Option<DateTime<Utc>>,
}

/// Raw per-model probability triple, scale unknown until normalized
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    /// Source tag of the upstream model
    pub source: String,
    pub raw: Triple,
}

/// Raw odds quote from one bookmaker, unvalidated
#[derive(Debug, Clone, PartialEq)]
pub struct OddsQuote {
    pub bookmaker_id: u64,
    /// Name as supplied by the provider, if it was embedded
    pub bookmaker_name: Option<String>,
    /// Raw outcome label ("Home", "1", ...)
    pub label: String,
    /// Decimal odds, absent when the provider value could not be parsed
    pub value: Option<f64>,
    pub market_id: u64,
}

/// Everything the provider returns for one fixture
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureBundle {
    pub fixture: Fixture,
    pub predictions: Vec<ModelPrediction>,
    pub odds: Vec<OddsQuote>,
}
