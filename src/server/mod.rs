//! HTTP API
//!
//! Serves fixture analyses, cache statistics and a health probe.

use crate::analysis::{MarketAgreement, VolumeEstimate};
use crate::cache::CacheStats;
use crate::engine::{AnalysisRequest, FixtureAnalysis, FixtureAnalyzer};
use crate::error::{Result, ServiceError};
use crate::model::{ConfidenceLabel, ConsensusStrategy};
use crate::types::{Fixture, Outcome};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State shared across handlers
pub struct AppState {
    pub analyzer: FixtureAnalyzer,
}

impl AppState {
    pub fn new(analyzer: FixtureAnalyzer) -> Self {
        Self { analyzer }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    /// Preferred bookmaker id
    pub bookmaker: Option<String>,
}

/// Response body of the analysis endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub fixture: Fixture,
    pub consensus: ConsensusView,
    pub odds: Option<OddsView>,
    pub expected_value: Option<ExpectedValueView>,
    pub market: Option<MarketView>,
    pub ensemble: EnsembleView,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsensusView {
    pub home: Decimal,
    pub draw: Decimal,
    pub away: Decimal,
    pub predicted: Outcome,
    pub confidence: ConfidenceLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct OddsView {
    pub bookmaker_id: u64,
    pub bookmaker: String,
    pub home: Option<Decimal>,
    pub draw: Option<Decimal>,
    pub away: Option<Decimal>,
    pub complete: bool,
}

/// EV per outcome in percent
#[derive(Debug, Clone, Serialize)]
pub struct ExpectedValueView {
    pub home: Option<Decimal>,
    pub draw: Option<Decimal>,
    pub away: Option<Decimal>,
    pub best_bet: Option<Outcome>,
    pub best_ev: Option<Decimal>,
    pub capped: Vec<Outcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketView {
    pub implied_home: Option<Decimal>,
    pub implied_draw: Option<Decimal>,
    pub implied_away: Option<Decimal>,
    pub margin_pct: Option<Decimal>,
    pub favorite: Option<Outcome>,
    pub volume: Option<VolumeEstimate>,
    pub agreement: Option<MarketAgreement>,
    pub value_opportunity: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnsembleView {
    pub model_count: usize,
    pub consensus_ratio: Decimal,
    pub variance: Decimal,
    pub strategy: ConsensusStrategy,
}

fn round(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(dp))
        .unwrap_or_default()
}

fn round_opt(value: Option<f64>, dp: u32) -> Option<Decimal> {
    value.map(|v| round(v, dp))
}

impl From<&FixtureAnalysis> for AnalysisResponse {
    fn from(analysis: &FixtureAnalysis) -> Self {
        let consensus = &analysis.consensus;

        Self {
            fixture: analysis.fixture.clone(),
            consensus: ConsensusView {
                home: round(consensus.probabilities.home, 4),
                draw: round(consensus.probabilities.draw, 4),
                away: round(consensus.probabilities.away, 4),
                predicted: consensus.predicted,
                confidence: consensus.confidence,
            },
            odds: analysis.odds.as_ref().map(|snapshot| OddsView {
                bookmaker_id: snapshot.bookmaker_id,
                bookmaker: snapshot.bookmaker.clone(),
                home: round_opt(snapshot.odds.home, 2),
                draw: round_opt(snapshot.odds.draw, 2),
                away: round_opt(snapshot.odds.away, 2),
                complete: snapshot.complete,
            }),
            expected_value: analysis.expected_value.as_ref().map(|ev| ExpectedValueView {
                home: round_opt(ev.home, 2),
                draw: round_opt(ev.draw, 2),
                away: round_opt(ev.away, 2),
                best_bet: ev.best_bet,
                best_ev: round_opt(ev.best_ev, 2),
                capped: ev.capped.clone(),
            }),
            market: analysis.market.as_ref().map(|m| MarketView {
                implied_home: round_opt(m.implied.home, 2),
                implied_draw: round_opt(m.implied.draw, 2),
                implied_away: round_opt(m.implied.away, 2),
                margin_pct: round_opt(m.margin_pct, 2),
                favorite: m.favorite,
                volume: m.volume,
                agreement: m.agreement,
                value_opportunity: m.value_opportunity,
            }),
            ensemble: EnsembleView {
                model_count: consensus.model_count,
                consensus_ratio: round(consensus.consensus_ratio, 4),
                variance: round(consensus.variance, 6),
                strategy: consensus.strategy,
            },
            warnings: analysis.warnings.clone(),
            generated_at: analysis.generated_at,
        }
    }
}

/// Positive numeric id from a path or query segment
fn parse_id(raw: &str, what: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ServiceError::InvalidInput(format!(
            "{} must be a positive integer, got {:?}",
            what, raw
        ))),
        Ok(id) => Ok(id),
    }
}

// ============ HTTP API Handlers ============

/// Health check
async fn health_check() -> &'static str {
    "OK"
}

/// Analysis for one fixture
async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(fixture_id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>> {
    let fixture_id = parse_id(&fixture_id, "fixture id")?;
    let bookmaker = query
        .bookmaker
        .as_deref()
        .map(|raw| parse_id(raw, "bookmaker"))
        .transpose()?;

    let request = AnalysisRequest::new(fixture_id).with_bookmaker(bookmaker);
    let analysis = state.analyzer.analyze(&request).await?;

    Ok(Json(AnalysisResponse::from(analysis.as_ref())))
}

/// Cache hit/miss counters
async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.analyzer.cache_stats().await)
}

/// Create API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/fixtures/{id}/analysis", get(get_analysis))
        .route("/cache/stats", get(get_cache_stats))
        .with_state(state)
}

/// Start API server
pub async fn start_server(
    state: Arc<AppState>,
    host: &str,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("API server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
