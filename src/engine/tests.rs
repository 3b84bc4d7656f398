//! Tests for the fixture analysis pipeline

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::cache::clock::ManualClock;
    use crate::client::MockFixtureProvider;
    use crate::model::ConsensusStrategy;
    use crate::types::{ModelPrediction, OddsQuote, Outcome, Triple};

    fn fixture() -> Fixture {
        Fixture {
            id: 19134454,
            name: "Arsenal vs Chelsea".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            league: "Premier League".to_string(),
            kickoff: None,
        }
    }

    fn prediction(source: &str, home: f64, draw: f64, away: f64) -> ModelPrediction {
        ModelPrediction {
            source: source.to_string(),
            raw: Triple::new(home, draw, away),
        }
    }

    fn quote(bookmaker_id: u64, label: &str, value: f64) -> OddsQuote {
        OddsQuote {
            bookmaker_id,
            bookmaker_name: None,
            label: label.to_string(),
            value: Some(value),
            market_id: 1,
        }
    }

    fn bundle() -> FixtureBundle {
        FixtureBundle {
            fixture: fixture(),
            predictions: vec![prediction("sportmonks", 52.0, 20.0, 28.0)],
            odds: vec![
                quote(2, "Home", 2.10),
                quote(2, "Draw", 3.40),
                quote(2, "Away", 3.60),
                quote(20, "Home", 2.05),
                quote(20, "Draw", 3.50),
                quote(20, "Away", 3.80),
            ],
        }
    }

    fn analyzer_with(mock: MockFixtureProvider) -> (FixtureAnalyzer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let analyzer =
            FixtureAnalyzer::with_clock(Arc::new(mock), &Config::default(), clock.clone());
        (analyzer, clock)
    }

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-6
    }

    #[test]
    fn test_compute_full_pipeline() {
        let (analyzer, _clock) = analyzer_with(MockFixtureProvider::new());
        let analysis = analyzer.compute(bundle(), None).unwrap();

        assert_eq!(analysis.consensus.strategy, ConsensusStrategy::SingleModel);
        assert_eq!(analysis.consensus.predicted, Outcome::Home);
        assert!(approx(analysis.consensus.probabilities.home, 0.52));

        let odds = analysis.odds.as_ref().unwrap();
        assert_eq!(odds.bookmaker_id, 2);
        assert_eq!(odds.bookmaker, "bet365");

        let ev = analysis.expected_value.as_ref().unwrap();
        assert!(approx(ev.home.unwrap(), 9.2));
        assert_eq!(ev.best_bet, Some(Outcome::Home));

        let market = analysis.market.as_ref().unwrap();
        assert_eq!(market.favorite, Some(Outcome::Home));
        assert_eq!(market.agreement, Some(crate::analysis::MarketAgreement::Agreement));
        assert!(!market.value_opportunity);

        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.ttl_class(), TtlClass::Short);
    }

    #[test]
    fn test_compute_three_model_plurality() {
        let (analyzer, _clock) = analyzer_with(MockFixtureProvider::new());
        let mut input = bundle();
        input.predictions = vec![
            prediction("a", 50.0, 30.0, 20.0),
            prediction("b", 60.0, 25.0, 15.0),
            prediction("c", 20.0, 30.0, 50.0),
        ];

        let analysis = analyzer.compute(input, None).unwrap();
        let consensus = &analysis.consensus;
        assert_eq!(consensus.strategy, ConsensusStrategy::PluralityEnsemble);
        assert_eq!(consensus.predicted, Outcome::Home);
        assert_eq!(consensus.model_count, 3);
        assert!(approx(consensus.consensus_ratio, 2.0 / 3.0));
        assert!(approx(consensus.blend.home, 0.60));
        assert!(approx(consensus.probabilities.sum(), 1.0));
    }

    #[test]
    fn test_compute_preferred_bookmaker() {
        let (analyzer, _clock) = analyzer_with(MockFixtureProvider::new());
        let analysis = analyzer.compute(bundle(), Some(20)).unwrap();
        let odds = analysis.odds.unwrap();
        assert_eq!(odds.bookmaker_id, 20);
        assert_eq!(odds.bookmaker, "Pinnacle");
    }

    #[test]
    fn test_compute_without_predictions_is_not_found() {
        let (analyzer, _clock) = analyzer_with(MockFixtureProvider::new());
        let mut input = bundle();
        input.predictions.clear();

        let err = analyzer.compute(input, None).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_compute_all_models_degenerate_is_not_found() {
        let (analyzer, _clock) = analyzer_with(MockFixtureProvider::new());
        let mut input = bundle();
        input.predictions = vec![prediction("zero", 0.0, 0.0, 0.0)];

        let err = analyzer.compute(input, None).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_compute_without_odds() {
        let (analyzer, _clock) = analyzer_with(MockFixtureProvider::new());
        let mut input = bundle();
        input.odds.clear();

        let analysis = analyzer.compute(input, None).unwrap();
        assert!(analysis.odds.is_none());
        assert!(analysis.expected_value.is_none());
        assert!(analysis.market.is_none());
        assert_eq!(analysis.warnings, vec!["no full-time result odds available".to_string()]);
        assert_eq!(analysis.ttl_class(), TtlClass::Medium);
    }

    #[test]
    fn test_compute_collects_warnings() {
        let (analyzer, _clock) = analyzer_with(MockFixtureProvider::new());
        let mut input = bundle();
        input.predictions = vec![
            prediction("drifting", 60.0, 30.0, 20.0),
            prediction("broken", f64::NAN, 0.3, 0.3),
        ];
        input.odds[0].value = Some(1.0);

        let analysis = analyzer.compute(input, None).unwrap();
        assert_eq!(analysis.consensus.model_count, 1);
        assert_eq!(analysis.warnings.len(), 3);
        assert!(analysis.warnings[0].contains("drifting"));
        assert!(analysis.warnings[1].contains("broken"));
        assert!(analysis.warnings[2].contains("bookmaker 2"));
        assert_eq!(analysis.odds.unwrap().odds.home, None);
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let mut mock = MockFixtureProvider::new();
        mock.expect_fetch_fixture()
            .times(1)
            .returning(|_| Ok(bundle()));
        let (analyzer, _clock) = analyzer_with(mock);
        let request = AnalysisRequest::new(19134454);

        let first = analyzer.analyze(&request).await.unwrap();
        let second = analyzer.analyze(&request).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = analyzer.cache_stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetched_once() {
        let mut mock = MockFixtureProvider::new();
        mock.expect_fetch_fixture()
            .times(2)
            .returning(|_| Ok(bundle()));
        let (analyzer, clock) = analyzer_with(mock);
        let request = AnalysisRequest::new(19134454);

        analyzer.analyze(&request).await.unwrap();
        clock.advance(chrono::Duration::seconds(299));
        analyzer.analyze(&request).await.unwrap();

        // Odds are present, so the entry lives in the short window
        clock.advance(chrono::Duration::seconds(1));
        analyzer.analyze(&request).await.unwrap();
        analyzer.analyze(&request).await.unwrap();

        let stats = analyzer.cache_stats().await;
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 2);
    }

    #[tokio::test]
    async fn test_bookmaker_param_is_separate_entry() {
        let mut mock = MockFixtureProvider::new();
        mock.expect_fetch_fixture()
            .times(2)
            .returning(|_| Ok(bundle()));
        let (analyzer, _clock) = analyzer_with(mock);

        let default = analyzer.analyze(&AnalysisRequest::new(19134454)).await.unwrap();
        let pinnacle = analyzer
            .analyze(&AnalysisRequest::new(19134454).with_bookmaker(Some(20)))
            .await
            .unwrap();

        assert_eq!(default.odds.as_ref().unwrap().bookmaker_id, 2);
        assert_eq!(pinnacle.odds.as_ref().unwrap().bookmaker_id, 20);
        assert_eq!(analyzer.cache_stats().await.entries, 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_not_cached() {
        let mut mock = MockFixtureProvider::new();
        mock.expect_fetch_fixture()
            .times(2)
            .returning(|id| Err(ServiceError::NotFound(format!("fixture {}", id))));
        let (analyzer, _clock) = analyzer_with(mock);
        let request = AnalysisRequest::new(42);

        for _ in 0..2 {
            let err = analyzer.analyze(&request).await.unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        }
        assert_eq!(analyzer.cache_stats().await.entries, 0);
    }

    #[test]
    fn test_request_cache_key() {
        assert_eq!(AnalysisRequest::new(7).cache_key().to_string(), "fixture:7");
        assert_eq!(
            AnalysisRequest::new(7).with_bookmaker(Some(2)).cache_key().to_string(),
            "fixture:7?bookmaker=2"
        );
    }
}
