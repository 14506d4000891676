//! Validation report types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One data-quality finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Fewer observations than weekdays in the covered span.
    MissingData {
        expected_days: usize,
        observed_days: usize,
        missing_ratio: f64,
    },
    /// Daily return flagged by the configured outlier method.
    Outlier {
        date: NaiveDate,
        close: f64,
        daily_return: f64,
        score: f64,
    },
    /// Calendar gap between consecutive observations.
    DateGap {
        from: NaiveDate,
        to: NaiveDate,
        days: i64,
    },
    /// Single-day jump large enough to be an unadjusted split or dividend.
    PotentialSplit {
        date: NaiveDate,
        previous_close: f64,
        close: f64,
        ratio: f64,
    },
    DuplicateDate { index: usize, date: NaiveDate },
    /// The raw record could not be turned into a price series at all.
    Malformed { message: String },
}

/// Per-check anomaly counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnomalyCounts {
    pub missing_days: usize,
    pub outliers: usize,
    pub gaps: usize,
    pub potential_splits: usize,
    pub duplicates: usize,
}

/// Outcome of [`crate::validation::PriceSeriesValidator::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ticker: String,
    pub is_valid: bool,
    pub reliability_score: f64,
    pub completeness_score: f64,
    pub consistency_score: f64,
    pub total_points: usize,
    pub expected_points: usize,
    pub missing_ratio: f64,
    pub counts: AnomalyCounts,
    pub anomalies: Vec<Anomaly>,
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    pub fn outliers(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies
            .iter()
            .filter(|a| matches!(a, Anomaly::Outlier { .. }))
    }
}
