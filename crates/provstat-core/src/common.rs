// crates/provstat-core/src/common.rs
use serde::{Deserialize, Serialize};

/// Simple aggregate statistics for a loaded dataset.
///
/// Returned by [`Dataset::stats`](crate::Dataset::stats), these counts
/// reflect what survived harmonization, after unmapped names were dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub provinces: usize,
    pub provinces_with_region: usize,
    pub regions: usize,
    pub series_rows: usize,
    pub series_years: usize,
    pub indexed_countries_2021: usize,
    pub indexed_countries_2023: usize,
    pub shapes: usize,
}

/// A value compared against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub current: f64,
    pub previous: Option<f64>,
    /// Smallest absolute change worth reporting.
    pub threshold: f64,
}

impl Delta {
    pub fn new(current: f64, previous: Option<f64>, threshold: f64) -> Self {
        Delta {
            current,
            previous,
            threshold,
        }
    }

    pub fn change(&self) -> Option<f64> {
        self.previous.map(|p| self.current - p)
    }

    /// `false` when there is no previous value or the change is below the threshold.
    pub fn is_significant(&self) -> bool {
        self.change().is_some_and(|c| c.abs() >= self.threshold)
    }
}

/// A 1-based rank compared against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub current: usize,
    pub previous: Option<usize>,
    /// Number of ranked entries in the current period.
    pub total: usize,
}

impl RankChange {
    /// Signed movement, `current - previous`. Negative means closer to #1.
    pub fn change(&self) -> Option<i64> {
        self.previous.map(|p| self.current as i64 - p as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_threshold() {
        assert!(Delta::new(6.55, Some(6.5), 0.01).is_significant());
        assert!(!Delta::new(6.505, Some(6.5), 0.01).is_significant());
        assert!(!Delta::new(6.5, None, 0.01).is_significant());
    }

    #[test]
    fn rank_change_sign() {
        let r = RankChange {
            current: 3,
            previous: Some(5),
            total: 10,
        };
        assert_eq!(r.change(), Some(-2));
    }
}
