//! Cross-bookmaker odds extraction
//!
//! Picks one bookmaker's full-time 1X2 prices for a fixture:
//! - Only quotes of the configured market are considered
//! - The first bookmaker (in provider order) quoting all three outcomes wins,
//!   otherwise the first bookmaker seen supplies partial prices
//! - Prices outside the sane range are dropped per outcome

pub mod bookmaker;

pub use bookmaker::{resolve_name, BOOKMAKERS, UNKNOWN_BOOKMAKER};

use crate::config::{EngineConfig, ProviderConfig};
use crate::types::{OddsQuote, Outcome};
use serde::{Deserialize, Serialize};

/// Decimal odds per outcome, each optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsTriple {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl OddsTriple {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut Option<f64> {
        match outcome {
            Outcome::Home => &mut self.home,
            Outcome::Draw => &mut self.draw,
            Outcome::Away => &mut self.away,
        }
    }

    pub fn is_complete(&self) -> bool {
        Outcome::ALL.iter().all(|o| self.get(*o).is_some())
    }

    pub fn is_empty(&self) -> bool {
        Outcome::ALL.iter().all(|o| self.get(*o).is_none())
    }
}

/// One bookmaker's usable 1X2 prices for a fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub bookmaker_id: u64,
    pub bookmaker: String,
    pub odds: OddsTriple,
    pub complete: bool,
}

/// Snapshot plus the data quality notes raised while building it
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub snapshot: Option<MarketSnapshot>,
    pub warnings: Vec<String>,
}

/// Quotes of a single bookmaker, first price per outcome
#[derive(Debug)]
struct BookmakerQuotes<'a> {
    id: u64,
    name: Option<&'a str>,
    prices: [Option<Option<f64>>; 3],
}

impl BookmakerQuotes<'_> {
    fn quoted(&self, outcome: Outcome) -> bool {
        self.prices[outcome.index()].is_some()
    }

    fn is_complete(&self) -> bool {
        Outcome::ALL.iter().all(|o| self.quoted(*o))
    }
}

#[derive(Debug, Clone)]
pub struct OddsExtractor {
    market_id: u64,
    min_odds: f64,
    max_odds: f64,
}

impl OddsExtractor {
    pub fn new(market_id: u64, min_odds: f64, max_odds: f64) -> Self {
        Self {
            market_id,
            min_odds,
            max_odds,
        }
    }

    pub fn from_config(provider: &ProviderConfig, engine: &EngineConfig) -> Self {
        Self::new(provider.market_id, engine.min_odds, engine.max_odds)
    }

    /// Odds strictly inside the configured range
    pub fn is_valid(&self, value: f64) -> bool {
        value.is_finite() && value > self.min_odds && value < self.max_odds
    }

    pub fn extract(&self, quotes: &[OddsQuote], preferred: Option<u64>) -> Extraction {
        let mut extraction = Extraction::default();
        let books = self.group(quotes);

        let chosen = preferred
            .and_then(|id| books.iter().find(|b| b.id == id))
            .or_else(|| books.iter().find(|b| b.is_complete()))
            .or_else(|| books.first());

        let Some(book) = chosen else {
            tracing::debug!("No 1X2 quotes for market {}", self.market_id);
            return extraction;
        };

        let mut odds = OddsTriple::default();
        for outcome in Outcome::ALL {
            let Some(raw) = book.prices[outcome.index()] else {
                continue;
            };
            match raw {
                Some(value) if self.is_valid(value) => *odds.slot(outcome) = Some(value),
                _ => {
                    let shown = raw.map(|v| v.to_string()).unwrap_or_else(|| "unparseable".into());
                    tracing::warn!(
                        bookmaker_id = book.id,
                        outcome = %outcome,
                        "Dropping odds {} outside ({}, {})",
                        shown,
                        self.min_odds,
                        self.max_odds
                    );
                    extraction.warnings.push(format!(
                        "{} odds {} from bookmaker {} dropped",
                        outcome, shown, book.id
                    ));
                }
            }
        }

        if odds.is_empty() {
            tracing::warn!(bookmaker_id = book.id, "No valid odds left after validation");
            extraction
                .warnings
                .push(format!("no valid odds from bookmaker {}", book.id));
            return extraction;
        }

        extraction.snapshot = Some(MarketSnapshot {
            bookmaker_id: book.id,
            bookmaker: resolve_name(book.id, book.name),
            complete: odds.is_complete(),
            odds,
        });
        extraction
    }

    /// Group market quotes by bookmaker, keeping first-seen order
    fn group<'a>(&self, quotes: &'a [OddsQuote]) -> Vec<BookmakerQuotes<'a>> {
        let mut books: Vec<BookmakerQuotes<'a>> = Vec::new();

        for quote in quotes.iter().filter(|q| q.market_id == self.market_id) {
            let Some(outcome) = Outcome::from_label(&quote.label) else {
                continue;
            };

            let idx = match books.iter().position(|b| b.id == quote.bookmaker_id) {
                Some(idx) => idx,
                None => {
                    books.push(BookmakerQuotes {
                        id: quote.bookmaker_id,
                        name: None,
                        prices: [None; 3],
                    });
                    books.len() - 1
                }
            };

            let book = &mut books[idx];
            if book.name.is_none() {
                book.name = quote.bookmaker_name.as_deref();
            }
            let slot = &mut book.prices[outcome.index()];
            if slot.is_none() {
                *slot = Some(quote.value);
            }
        }

        books
    }
}

impl Default for OddsExtractor {
    fn default() -> Self {
        Self::new(1, 1.01, 1000.0)
    }
}
