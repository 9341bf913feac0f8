//! Score to quality indicator mapping
//!
//! Raw scores arrive on a 0-100 scale from the scoring engine or as strings
//! from the hidden score fields. Every input maps to a valid indicator.

use serde::Serialize;

/// Lowest raw score rated as ok
pub const OK_THRESHOLD: f64 = 41.0;
/// Lowest raw score rated as good
pub const GOOD_THRESHOLD: f64 = 71.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorLevel {
    NoData,
    Bad,
    Ok,
    Good,
}

impl IndicatorLevel {
    /// CSS class applied by every score widget
    pub fn display_class(&self) -> &'static str {
        match self {
            IndicatorLevel::NoData => "na",
            IndicatorLevel::Bad => "bad",
            IndicatorLevel::Ok => "ok",
            IndicatorLevel::Good => "good",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreIndicator {
    pub level: IndicatorLevel,
    pub display_class: &'static str,
}

impl ScoreIndicator {
    pub fn new(level: IndicatorLevel) -> Self {
        Self {
            level,
            display_class: level.display_class(),
        }
    }

    pub fn no_data() -> Self {
        Self::new(IndicatorLevel::NoData)
    }
}

/// Map a raw score to its indicator
///
/// Missing, non-finite and zero scores mean "no data yet". Buckets are
/// inclusive on their lower edge.
pub fn map_score(raw: Option<f64>) -> ScoreIndicator {
    let level = match raw {
        None => IndicatorLevel::NoData,
        Some(score) if !score.is_finite() => IndicatorLevel::NoData,
        Some(score) if score == 0.0 => IndicatorLevel::NoData,
        Some(score) if score < OK_THRESHOLD => IndicatorLevel::Bad,
        Some(score) if score < GOOD_THRESHOLD => IndicatorLevel::Ok,
        Some(_) => IndicatorLevel::Good,
    };
    ScoreIndicator::new(level)
}

/// Parse a score read from a form field. Blank or garbage yields `None`.
pub fn parse_raw_score(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Map a score stored in a form field
pub fn map_field_value(value: &str) -> ScoreIndicator {
    map_score(parse_raw_score(value))
}

/// Format a score the way it is written back to the hidden fields
pub fn format_raw_score(raw: Option<f64>) -> String {
    match raw {
        Some(score) if score.is_finite() && score.fract() == 0.0 => format!("{}", score as i64),
        Some(score) if score.is_finite() => format!("{}", score),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_missing_score_is_no_data() {
        assert_eq!(map_score(None).level, IndicatorLevel::NoData);
        assert_eq!(map_score(Some(f64::NAN)).level, IndicatorLevel::NoData);
        assert_eq!(map_score(Some(f64::INFINITY)).level, IndicatorLevel::NoData);
    }

    #[test]
    fn test_zero_is_no_data_not_bad() {
        let indicator = map_score(Some(0.0));
        assert_eq!(indicator.level, IndicatorLevel::NoData);
        assert_eq!(indicator.display_class, "na");
    }

    #[test]
    fn test_threshold_edges() {
        assert_eq!(map_score(Some(1.0)).level, IndicatorLevel::Bad);
        assert_eq!(map_score(Some(40.0)).level, IndicatorLevel::Bad);
        assert_eq!(map_score(Some(40.9)).level, IndicatorLevel::Bad);
        assert_eq!(map_score(Some(41.0)).level, IndicatorLevel::Ok);
        assert_eq!(map_score(Some(70.0)).level, IndicatorLevel::Ok);
        assert_eq!(map_score(Some(71.0)).level, IndicatorLevel::Good);
        assert_eq!(map_score(Some(100.0)).level, IndicatorLevel::Good);
    }

    #[test]
    fn test_negative_scores_are_bad() {
        assert_eq!(map_score(Some(-5.0)).level, IndicatorLevel::Bad);
    }

    #[test]
    fn test_field_values() {
        assert_eq!(map_field_value("").level, IndicatorLevel::NoData);
        assert_eq!(map_field_value("abc").level, IndicatorLevel::NoData);
        assert_eq!(map_field_value(" 55 ").level, IndicatorLevel::Ok);
        assert_eq!(map_field_value("0").level, IndicatorLevel::NoData);
    }

    #[test]
    fn test_format_raw_score() {
        assert_eq!(format_raw_score(Some(45.0)), "45");
        assert_eq!(format_raw_score(Some(45.5)), "45.5");
        assert_eq!(format_raw_score(None), "");
        assert_eq!(format_raw_score(Some(f64::NAN)), "");
    }

    #[test]
    fn test_display_class_matches_level() {
        for level in [
            IndicatorLevel::NoData,
            IndicatorLevel::Bad,
            IndicatorLevel::Ok,
            IndicatorLevel::Good,
        ] {
            assert_eq!(ScoreIndicator::new(level).display_class, level.display_class());
        }
    }

    fn rank(level: IndicatorLevel) -> u8 {
        match level {
            IndicatorLevel::NoData => 0,
            IndicatorLevel::Bad => 1,
            IndicatorLevel::Ok => 2,
            IndicatorLevel::Good => 3,
        }
    }

    proptest! {
        /// Property: mapping is deterministic for any input
        #[test]
        fn mapping_is_deterministic(score in proptest::num::f64::ANY) {
            prop_assert_eq!(map_score(Some(score)), map_score(Some(score)));
        }

        /// Property: positive scores never decrease in rank as they grow
        #[test]
        fn mapping_is_monotonic(a in 0.001f64..200.0, b in 0.001f64..200.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rank(map_score(Some(low)).level) <= rank(map_score(Some(high)).level));
        }

        /// Property: any string maps to some indicator without panicking
        #[test]
        fn field_values_are_total(value in ".*") {
            let indicator = map_field_value(&value);
            prop_assert_eq!(indicator.display_class, indicator.level.display_class());
        }
    }
}
