use std::collections::BTreeSet;

use crate::models::{DashboardMetrics, SurveyRecord};

pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl DashboardMetrics {
    /// The three headline numbers over the filtered table. An empty table
    /// (or one with no stress scores) leaves the mean undefined rather than
    /// producing NaN.
    pub fn compute(filtered: &[SurveyRecord]) -> Self {
        let countries: BTreeSet<&str> = filtered
            .iter()
            .filter_map(|r| r.country.as_deref())
            .collect();

        DashboardMetrics {
            total_respondents: filtered.len(),
            country_count: countries.len(),
            avg_stress: mean(filtered.iter().filter_map(|r| r.stress_score)),
        }
    }
}
