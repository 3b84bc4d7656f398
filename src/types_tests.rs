//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::types::*;

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(serde_json::to_string(&Outcome::Home).unwrap(), "\"home\"");
        assert_eq!(serde_json::to_string(&Outcome::Draw).unwrap(), "\"draw\"");
        let away: Outcome = serde_json::from_str("\"away\"").unwrap();
        assert_eq!(away, Outcome::Away);
    }

    #[test]
    fn test_outcome_from_label() {
        assert_eq!(Outcome::from_label("Home"), Some(Outcome::Home));
        assert_eq!(Outcome::from_label(" 1 "), Some(Outcome::Home));
        assert_eq!(Outcome::from_label("X"), Some(Outcome::Draw));
        assert_eq!(Outcome::from_label("tie"), Some(Outcome::Draw));
        assert_eq!(Outcome::from_label("2"), Some(Outcome::Away));
        assert_eq!(Outcome::from_label("Over 2.5"), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Draw.to_string(), "draw");
    }

    #[test]
    fn test_triple_get_set() {
        let mut triple = Triple::new(0.5, 0.3, 0.2);
        assert_eq!(triple.get(Outcome::Draw), 0.3);
        triple.set(Outcome::Away, 0.4);
        assert_eq!(triple.as_array(), [0.5, 0.3, 0.4]);
    }

    #[test]
    fn test_triple_argmax() {
        assert_eq!(Triple::new(0.2, 0.5, 0.3).argmax(), Outcome::Draw);
        assert_eq!(Triple::new(0.2, 0.3, 0.5).argmax(), Outcome::Away);
        assert_eq!(Triple::new(0.5, 0.3, 0.5).max_value(), 0.5);
    }

    #[test]
    fn test_triple_argmax_tie_break() {
        assert_eq!(Triple::new(0.4, 0.4, 0.2).argmax(), Outcome::Home);
        assert_eq!(Triple::new(0.2, 0.4, 0.4).argmax(), Outcome::Draw);
        assert_eq!(Triple::new(0.4, 0.2, 0.4).argmax(), Outcome::Home);
        assert_eq!(Triple::new(1.0, 1.0, 1.0).argmax(), Outcome::Home);
    }

    #[test]
    fn test_triple_scaled_sum() {
        let scaled = Triple::new(50.0, 30.0, 20.0).scaled(0.01);
        assert!((scaled.sum() - 1.0).abs() < 1e-12);
    }
}
