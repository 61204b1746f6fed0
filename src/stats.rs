//! Descriptive statistics over keyword interest series.
//!
//! [`aggregate`] is a pure function: same input, same output, no side effects
//! beyond warning about keywords it has to skip. The driver treats an empty
//! result as a recoverable no-data condition, not an error.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::models::KeywordStats;

/// Round to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Compute per-keyword statistics from raw value sequences.
///
/// For each keyword with at least one sample:
/// - `average`: arithmetic mean, rounded to two decimals
/// - `min` / `max`: exact sample values
/// - `growth_rate`: percentage change from the first to the last sample,
///   rounded to two decimals, or `0.0` when the first sample is zero
///
/// Keywords with an empty sequence are skipped with a warning and omitted
/// from the result. An entirely empty input yields an empty map.
pub fn aggregate(series: &BTreeMap<String, Vec<f64>>) -> BTreeMap<String, KeywordStats> {
    let mut out = BTreeMap::new();

    for (keyword, values) in series {
        if values.is_empty() {
            warn!(%keyword, "no samples for keyword; skipping");
            continue;
        }

        let sum: f64 = values.iter().sum();
        let average = round2(sum / values.len() as f64);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let first = values[0];
        let last = values[values.len() - 1];
        let growth_rate = if first == 0.0 {
            0.0
        } else {
            round2((last - first) / first * 100.0)
        };

        debug!(%keyword, average, min, max, growth_rate, "computed keyword stats");
        out.insert(
            keyword.clone(),
            KeywordStats {
                keyword: keyword.clone(),
                average,
                min,
                max,
                growth_rate,
            },
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(&str, &[f64])]) -> BTreeMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_growth_rate_formula() {
        let out = aggregate(&series(&[("ai", &[50.0, 60.0, 75.0])]));
        let stats = &out["ai"];
        assert_eq!(stats.growth_rate, 50.0);
        assert_eq!(stats.average, 61.67);
        assert_eq!(stats.min, 50.0);
        assert_eq!(stats.max, 75.0);
    }

    #[test]
    fn test_growth_rate_rounding() {
        // (70 - 30) / 30 * 100 = 133.333...
        let out = aggregate(&series(&[("x", &[30.0, 70.0])]));
        assert_eq!(out["x"].growth_rate, 133.33);
    }

    #[test]
    fn test_growth_rate_zero_first_sample() {
        let out = aggregate(&series(&[("x", &[0.0, 80.0])]));
        assert_eq!(out["x"].growth_rate, 0.0);
        assert_eq!(out["x"].max, 80.0);
    }

    #[test]
    fn test_single_sample() {
        let out = aggregate(&series(&[("x", &[42.0])]));
        let stats = &out["x"];
        assert_eq!(stats.average, 42.0);
        assert_eq!(stats.min, 42.0);
        assert_eq!(stats.max, 42.0);
        assert_eq!(stats.growth_rate, 0.0);
    }

    #[test]
    fn test_empty_sequences_skipped() {
        let out = aggregate(&series(&[("empty", &[]), ("full", &[1.0, 2.0])]));
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("full"));
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let out = aggregate(&BTreeMap::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let input = series(&[("a", &[1.0, 3.0]), ("b", &[10.0, 5.0])]);
        let first = aggregate(&input);
        let second = aggregate(&input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_independent_across_keywords() {
        // Same entries assembled in opposite insertion orders must agree.
        let forward: BTreeMap<String, Vec<f64>> = [("a", vec![1.0, 2.0]), ("b", vec![9.0, 3.0])]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let reverse: BTreeMap<String, Vec<f64>> = [("b", vec![9.0, 3.0]), ("a", vec![1.0, 2.0])]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(aggregate(&forward), aggregate(&reverse));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005), 1.0); // 1.005 is not exactly representable
        assert_eq!(round2(2.675_1), 2.68);
        assert_eq!(round2(-1.333), -1.33);
    }
}
