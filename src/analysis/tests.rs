//! Unit tests for market indicator analysis

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::odds::OddsTriple;
    use crate::strategy::ExpectedValue;
    use crate::types::Outcome;

    fn odds(home: f64, draw: f64, away: f64) -> OddsTriple {
        OddsTriple {
            home: Some(home),
            draw: Some(draw),
            away: Some(away),
        }
    }

    #[test]
    fn test_margin_of_six_points() {
        // 50 + 28 + 28 = 106
        let quoted = odds(2.0, 100.0 / 28.0, 100.0 / 28.0);
        let indicators = MarketIndicatorAnalyzer::new().analyze(&quoted, None, None);
        let margin = indicators.margin_pct.unwrap();
        assert!((margin - 6.0).abs() < 1e-9, "margin {}", margin);
        assert_eq!(indicators.favorite, Some(Outcome::Home));
        assert_eq!(indicators.volume, Some(VolumeEstimate::Medium));
        assert_eq!(indicators.agreement, None);
    }

    #[test]
    fn test_implied_probabilities() {
        let indicators = MarketIndicatorAnalyzer::new().analyze(&odds(2.5, 4.0, 5.0), None, None);
        assert!((indicators.implied.home.unwrap() - 40.0).abs() < 1e-9);
        assert!((indicators.implied.draw.unwrap() - 25.0).abs() < 1e-9);
        assert!((indicators.implied.away.unwrap() - 20.0).abs() < 1e-9);
        // Underround: negative margin, very tight
        assert!(indicators.margin_pct.unwrap() < 0.0);
        assert_eq!(indicators.volume, Some(VolumeEstimate::High));
    }

    #[test]
    fn test_partial_odds_no_margin() {
        let partial = OddsTriple {
            home: Some(3.0),
            draw: None,
            away: Some(2.0),
        };
        let indicators =
            MarketIndicatorAnalyzer::new().analyze(&partial, Some(Outcome::Away), None);
        assert_eq!(indicators.implied.draw, None);
        assert_eq!(indicators.margin_pct, None);
        assert_eq!(indicators.volume, None);
        assert_eq!(indicators.favorite, Some(Outcome::Away));
        assert_eq!(indicators.agreement, Some(MarketAgreement::Agreement));
    }

    #[test]
    fn test_disagreement_with_value() {
        let ev = ExpectedValue {
            away: Some(12.0),
            ..Default::default()
        };
        let indicators = MarketIndicatorAnalyzer::new().analyze(
            &odds(1.8, 3.6, 4.5),
            Some(Outcome::Away),
            Some(&ev),
        );
        assert_eq!(indicators.favorite, Some(Outcome::Home));
        assert_eq!(indicators.agreement, Some(MarketAgreement::Disagreement));
        assert!(indicators.value_opportunity);
    }

    #[test]
    fn test_disagreement_without_value() {
        let ev = ExpectedValue {
            away: Some(-4.0),
            ..Default::default()
        };
        let indicators = MarketIndicatorAnalyzer::new().analyze(
            &odds(1.8, 3.6, 4.5),
            Some(Outcome::Away),
            Some(&ev),
        );
        assert_eq!(indicators.agreement, Some(MarketAgreement::Disagreement));
        assert!(!indicators.value_opportunity);
    }

    #[test]
    fn test_agreement_is_never_value_flagged() {
        let ev = ExpectedValue {
            home: Some(8.0),
            ..Default::default()
        };
        let quoted = odds(1.8, 3.6, 4.5);
        let indicators =
            MarketIndicatorAnalyzer::new().analyze(&quoted, Some(Outcome::Home), Some(&ev));
        assert_eq!(indicators.agreement, Some(MarketAgreement::Agreement));
        assert!(!indicators.value_opportunity);
    }

    #[test]
    fn test_volume_bands() {
        assert_eq!(VolumeEstimate::from_margin(3.0), VolumeEstimate::High);
        assert_eq!(VolumeEstimate::from_margin(5.0), VolumeEstimate::Medium);
        assert_eq!(VolumeEstimate::from_margin(7.9), VolumeEstimate::Medium);
        assert_eq!(VolumeEstimate::from_margin(8.0), VolumeEstimate::Low);
    }
}
