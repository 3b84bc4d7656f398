//! Fixture analysis pipeline
//!
//! For one fixture: serve from the result cache, or fetch from the provider
//! and run normalize → consensus → odds → expected value → market indicators,
//! then store the composed result under the TTL class of its most volatile
//! field group.

#[cfg(test)]
mod tests;

use crate::analysis::{MarketIndicatorAnalyzer, MarketIndicators};
use crate::cache::{
    CacheKey, CacheStats, Clock, FieldGroup, ResultCache, SystemClock, TtlClass, TtlPolicy,
};
use crate::client::FixtureProvider;
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::model::{
    normalize_all, ConsensusPrediction, EnsembleConsensusResolver, ProbabilityNormalizer,
};
use crate::odds::{MarketSnapshot, OddsExtractor};
use crate::strategy::{ExpectedValue, ExpectedValueCalculator};
use crate::types::{Fixture, FixtureBundle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// What the caller asked for; every field is part of the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub fixture_id: u64,
    /// Bookmaker to take odds from when it quotes the fixture
    pub bookmaker: Option<u64>,
}

impl AnalysisRequest {
    pub fn new(fixture_id: u64) -> Self {
        Self {
            fixture_id,
            bookmaker: None,
        }
    }

    pub fn with_bookmaker(mut self, bookmaker: Option<u64>) -> Self {
        self.bookmaker = bookmaker;
        self
    }

    pub fn cache_key(&self) -> CacheKey {
        let key = CacheKey::new(self.fixture_id);
        match self.bookmaker {
            Some(id) => key.with_param("bookmaker", id),
            None => key,
        }
    }
}

/// Decision-ready result for one fixture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureAnalysis {
    pub fixture: Fixture,
    pub consensus: ConsensusPrediction,
    pub odds: Option<MarketSnapshot>,
    pub expected_value: Option<ExpectedValue>,
    pub market: Option<MarketIndicators>,
    /// Corrections applied to the upstream data
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl FixtureAnalysis {
    /// Data sources that contributed to this result
    pub fn field_groups(&self) -> Vec<FieldGroup> {
        let mut groups = vec![FieldGroup::Fixture, FieldGroup::Predictions];
        if self.odds.is_some() {
            groups.push(FieldGroup::Odds);
        }
        groups
    }

    pub fn ttl_class(&self) -> TtlClass {
        TtlClass::most_volatile(self.field_groups())
    }
}

pub struct FixtureAnalyzer {
    provider: Arc<dyn FixtureProvider>,
    cache: ResultCache<Arc<FixtureAnalysis>>,
    clock: Arc<dyn Clock>,
    normalizer: ProbabilityNormalizer,
    resolver: EnsembleConsensusResolver,
    extractor: OddsExtractor,
    calculator: ExpectedValueCalculator,
    market: MarketIndicatorAnalyzer,
}

impl FixtureAnalyzer {
    pub fn new(provider: Arc<dyn FixtureProvider>, config: &Config) -> Self {
        Self::with_clock(provider, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        provider: Arc<dyn FixtureProvider>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache: ResultCache::with_clock(TtlPolicy::from(&config.cache), clock.clone()),
            clock,
            normalizer: ProbabilityNormalizer::new(
                config.provider.probability_scale,
                config.engine.sum_tolerance_pct,
            ),
            resolver: EnsembleConsensusResolver::new(),
            extractor: OddsExtractor::from_config(&config.provider, &config.engine),
            calculator: ExpectedValueCalculator::from_config(&config.engine),
            market: MarketIndicatorAnalyzer::new(),
        }
    }

    /// Cached analysis for `request`, fetching upstream on a miss
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Arc<FixtureAnalysis>> {
        let AnalysisRequest { fixture_id, bookmaker } = *request;

        self.cache
            .get_or_try_insert_with(request.cache_key(), move || async move {
                let bundle = self.provider.fetch_fixture(fixture_id).await?;
                let analysis = self.compute(bundle, bookmaker)?;
                let class = analysis.ttl_class();
                Ok((Arc::new(analysis), class))
            })
            .await
    }

    /// Run the pipeline over an already fetched bundle
    pub fn compute(
        &self,
        bundle: FixtureBundle,
        preferred: Option<u64>,
    ) -> Result<FixtureAnalysis> {
        let FixtureBundle {
            fixture,
            predictions,
            odds,
        } = bundle;

        let batch = normalize_all(&self.normalizer, &predictions);
        let mut warnings = batch.warnings;

        let consensus = self.resolver.resolve(&batch.triples).ok_or_else(|| {
            ServiceError::NotFound(format!(
                "no usable result predictions for fixture {}",
                fixture.id
            ))
        })?;

        let extraction = self.extractor.extract(&odds, preferred);
        let no_quotes = extraction.snapshot.is_none() && extraction.warnings.is_empty();
        warnings.extend(extraction.warnings);
        let snapshot = extraction.snapshot;

        let (expected_value, market) = match &snapshot {
            Some(snapshot) => {
                let report = self.calculator.calculate(&consensus.probabilities, &snapshot.odds);
                warnings.extend(report.warnings);
                let market = self.market.analyze(
                    &snapshot.odds,
                    Some(consensus.predicted),
                    Some(&report.expected_value),
                );
                (Some(report.expected_value), Some(market))
            }
            None => {
                debug!(
                    fixture_id = fixture.id,
                    "No usable odds, skipping EV and market indicators"
                );
                if no_quotes {
                    warnings.push("no full-time result odds available".to_string());
                }
                (None, None)
            }
        };

        info!(
            fixture_id = fixture.id,
            predicted = %consensus.predicted,
            models = consensus.model_count,
            best_bet = ?expected_value.as_ref().and_then(|ev| ev.best_bet),
            "Fixture analysis computed"
        );

        Ok(FixtureAnalysis {
            fixture,
            consensus,
            odds: snapshot,
            expected_value,
            market,
            warnings,
            generated_at: self.clock.now(),
        })
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
