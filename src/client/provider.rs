//! Sports data provider client
//!
//! Fetches one fixture with its participants, league, model predictions and
//! bookmaker odds embedded, and maps the loosely shaped payload onto the
//! engine's types.

use super::FixtureProvider;
use crate::config::ProviderConfig;
use crate::error::{Result, ServiceError};
use crate::types::{Fixture, FixtureBundle, ModelPrediction, OddsQuote, Triple};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Associations requested alongside the fixture
pub const FIXTURE_INCLUDES: &str = "participants;league;predictions;odds.bookmaker";

/// HTTP client for the provider's fixture endpoint
#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    base_url: String,
    api_token: String,
    prediction_type_id: u64,
}

#[derive(Debug, Deserialize)]
struct FixtureEnvelope {
    data: Option<RawFixture>,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    id: u64,
    name: Option<String>,
    starting_at: Option<String>,
    starting_at_timestamp: Option<i64>,
    league: Option<RawLeague>,
    #[serde(default)]
    participants: Vec<RawParticipant>,
    #[serde(default)]
    predictions: Vec<RawPrediction>,
    #[serde(default)]
    odds: Vec<RawOdd>,
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParticipant {
    name: Option<String>,
    meta: Option<RawParticipantMeta>,
}

#[derive(Debug, Deserialize)]
struct RawParticipantMeta {
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    id: Option<u64>,
    type_id: Option<u64>,
    /// Model tag, when the provider exposes one
    source: Option<String>,
    predictions: Option<RawProbabilities>,
}

#[derive(Debug, Deserialize)]
struct RawProbabilities {
    home: Option<RawNumber>,
    draw: Option<RawNumber>,
    away: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
struct RawOdd {
    bookmaker_id: Option<u64>,
    market_id: Option<u64>,
    label: Option<String>,
    value: Option<RawNumber>,
    bookmaker: Option<RawBookmaker>,
}

#[derive(Debug, Deserialize)]
struct RawBookmaker {
    name: Option<String>,
}

/// Numbers arrive either as JSON numbers or as strings ("2.10")
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            prediction_type_id: config.prediction_type_id,
        })
    }
}

#[async_trait]
impl FixtureProvider for ProviderClient {
    async fn fetch_fixture(&self, fixture_id: u64) -> Result<FixtureBundle> {
        let url = format!("{}/fixtures/{}", self.base_url, fixture_id);
        debug!("Fetching fixture {} from provider", fixture_id);

        let resp = self
            .http
            .get(&url)
            .header("Authorization", &self.api_token)
            .query(&[("include", FIXTURE_INCLUDES)])
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                return Err(ServiceError::NotFound(format!("fixture {}", fixture_id)));
            }
            status if !status.is_success() => {
                return Err(ServiceError::Upstream(format!(
                    "provider returned {} for fixture {}",
                    status, fixture_id
                )));
            }
            _ => {}
        }

        let body = resp.text().await?;
        parse_fixture(&body, fixture_id, self.prediction_type_id)
    }
}

/// Map a provider fixture payload onto a [`FixtureBundle`]
pub fn parse_fixture(
    body: &str,
    fixture_id: u64,
    prediction_type_id: u64,
) -> Result<FixtureBundle> {
    let envelope: FixtureEnvelope = serde_json::from_str(body)?;
    let raw = envelope
        .data
        .ok_or_else(|| ServiceError::NotFound(format!("fixture {}", fixture_id)))?;

    let team = |location: &str| {
        raw.participants
            .iter()
            .find(|p| {
                p.meta
                    .as_ref()
                    .and_then(|m| m.location.as_deref())
                    .is_some_and(|l| l.eq_ignore_ascii_case(location))
            })
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| "TBD".to_string())
    };
    let home_team = team("home");
    let away_team = team("away");

    let fixture = Fixture {
        id: raw.id,
        name: raw
            .name
            .clone()
            .unwrap_or_else(|| format!("{} vs {}", home_team, away_team)),
        league: raw
            .league
            .as_ref()
            .and_then(|l| l.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        kickoff: parse_kickoff(raw.starting_at_timestamp, raw.starting_at.as_deref()),
        home_team,
        away_team,
    };

    let predictions = raw
        .predictions
        .iter()
        .filter(|p| p.type_id == Some(prediction_type_id))
        .filter_map(|p| {
            let probs = p.predictions.as_ref()?;
            let raw = Triple::new(
                probs.home.as_ref()?.as_f64()?,
                probs.draw.as_ref()?.as_f64()?,
                probs.away.as_ref()?.as_f64()?,
            );
            let source = p
                .source
                .clone()
                .or_else(|| p.id.map(|id| format!("prediction-{}", id)))
                .unwrap_or_else(|| "unnamed".to_string());
            Some(ModelPrediction { source, raw })
        })
        .collect::<Vec<_>>();

    let odds = raw
        .odds
        .iter()
        .filter_map(|o| {
            Some(OddsQuote {
                bookmaker_id: o.bookmaker_id?,
                bookmaker_name: o.bookmaker.as_ref().and_then(|b| b.name.clone()),
                label: o.label.clone()?,
                value: o.value.as_ref().and_then(RawNumber::as_f64),
                market_id: o.market_id?,
            })
        })
        .collect::<Vec<_>>();

    debug!(
        fixture_id = fixture.id,
        "Parsed {} result predictions and {} odds quotes",
        predictions.len(),
        odds.len()
    );

    Ok(FixtureBundle {
        fixture,
        predictions,
        odds,
    })
}

fn parse_kickoff(timestamp: Option<i64>, text: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(ts) = timestamp {
        if let Some(dt) = Utc.timestamp_opt(ts, 0).single() {
            return Some(dt);
        }
    }
    let text = text?;
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| text.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "data": {
            "id": 19134454,
            "name": "Arsenal vs Chelsea",
            "starting_at": "2024-08-17 14:00:00",
            "league": { "id": 8, "name": "Premier League" },
            "participants": [
                { "id": 19, "name": "Arsenal", "meta": { "location": "home" } },
                { "id": 18, "name": "Chelsea", "meta": { "location": "away" } }
            ],
            "predictions": [
                {
                    "id": 1, "type_id": 237,
                    "predictions": { "home": 45.5, "draw": 27.1, "away": 27.4 }
                },
                {
                    "id": 2, "type_id": 237, "source": "poisson",
                    "predictions": { "home": "0.5", "draw": "0.3", "away": "0.2" }
                },
                { "id": 3, "type_id": 231, "predictions": { "yes": 61.2, "no": 38.8 } }
            ],
            "odds": [
                {
                    "id": 10, "bookmaker_id": 2, "market_id": 1, "label": "Home", "value": "2.10",
                    "bookmaker": { "name": "bet365" }
                },
                { "id": 11, "bookmaker_id": 2, "market_id": 1, "label": "Draw", "value": 3.4 },
                { "id": 12, "bookmaker_id": 2, "market_id": 1, "label": "Away", "value": "n/a" },
                { "id": 13, "market_id": 1, "label": "Home", "value": "2.2" }
            ]
        }
    }"#;

    #[test]
    fn test_parse_fixture_metadata() {
        let bundle = parse_fixture(PAYLOAD, 19134454, 237).unwrap();
        assert_eq!(bundle.fixture.id, 19134454);
        assert_eq!(bundle.fixture.home_team, "Arsenal");
        assert_eq!(bundle.fixture.away_team, "Chelsea");
        assert_eq!(bundle.fixture.league, "Premier League");
        assert_eq!(
            bundle.fixture.kickoff.unwrap().to_rfc3339(),
            "2024-08-17T14:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_result_predictions_only() {
        let bundle = parse_fixture(PAYLOAD, 19134454, 237).unwrap();
        assert_eq!(bundle.predictions.len(), 2);
        assert_eq!(bundle.predictions[0].source, "prediction-1");
        assert_eq!(bundle.predictions[0].raw, Triple::new(45.5, 27.1, 27.4));
        assert_eq!(bundle.predictions[1].source, "poisson");
        assert_eq!(bundle.predictions[1].raw.home, 0.5);
    }

    #[test]
    fn test_parse_odds_values() {
        let bundle = parse_fixture(PAYLOAD, 19134454, 237).unwrap();
        // Quote without a bookmaker id is dropped
        assert_eq!(bundle.odds.len(), 3);
        assert_eq!(bundle.odds[0].value, Some(2.10));
        assert_eq!(bundle.odds[0].bookmaker_name.as_deref(), Some("bet365"));
        assert_eq!(bundle.odds[1].value, Some(3.4));
        assert_eq!(bundle.odds[2].value, None);
    }

    #[test]
    fn test_null_data_is_not_found() {
        let err = parse_fixture(r#"{"data": null}"#, 5, 237).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_garbage_is_upstream_error() {
        let err = parse_fixture("<html>502</html>", 5, 237).unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }

    #[test]
    fn test_minimal_fixture_defaults() {
        let bundle = parse_fixture(r#"{"data": {"id": 5}}"#, 5, 237).unwrap();
        assert_eq!(bundle.fixture.home_team, "TBD");
        assert_eq!(bundle.fixture.name, "TBD vs TBD");
        assert_eq!(bundle.fixture.league, "Unknown");
        assert!(bundle.fixture.kickoff.is_none());
        assert!(bundle.predictions.is_empty());
        assert!(bundle.odds.is_empty());
    }

    #[test]
    fn test_kickoff_prefers_timestamp() {
        let kickoff = parse_kickoff(Some(1_723_903_200), Some("garbage")).unwrap();
        assert_eq!(kickoff.to_rfc3339(), "2024-08-17T14:00:00+00:00");
    }
}
