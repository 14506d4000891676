//! Data-quality validator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{check_range, ConfigError};

/// Outlier detection method applied to daily returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Standard deviations from the mean.
    ZScore,
    /// Multiples of the interquartile range beyond Q1/Q3.
    Iqr,
    /// Median-absolute-deviation based z-score.
    ModifiedZScore,
}

/// Validated validator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValidationConfigBuilder", into = "ValidationConfigBuilder")]
pub struct ValidationConfig {
    check_missing_data: bool,
    check_outliers: bool,
    check_gaps: bool,
    check_splits: bool,
    check_duplicates: bool,
    missing_data_threshold: f64,
    outlier_method: OutlierMethod,
    outlier_threshold: f64,
    max_gap_days: i64,
    split_threshold: f64,
    min_reliability_score: f64,
    max_outliers: usize,
    max_gaps: usize,
    max_duplicates: usize,
}

impl ValidationConfig {
    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder::default()
    }

    pub fn check_missing_data(&self) -> bool {
        self.check_missing_data
    }

    pub fn check_outliers(&self) -> bool {
        self.check_outliers
    }

    pub fn check_gaps(&self) -> bool {
        self.check_gaps
    }

    pub fn check_splits(&self) -> bool {
        self.check_splits
    }

    pub fn check_duplicates(&self) -> bool {
        self.check_duplicates
    }

    /// Maximum acceptable ratio of missing trading days.
    pub fn missing_data_threshold(&self) -> f64 {
        self.missing_data_threshold
    }

    pub fn outlier_method(&self) -> OutlierMethod {
        self.outlier_method
    }

    pub fn outlier_threshold(&self) -> f64 {
        self.outlier_threshold
    }

    /// Calendar days between consecutive dates above which a gap is reported.
    pub fn max_gap_days(&self) -> i64 {
        self.max_gap_days
    }

    /// Absolute single-day relative change above which a split is suspected.
    pub fn split_threshold(&self) -> f64 {
        self.split_threshold
    }

    pub fn min_reliability_score(&self) -> f64 {
        self.min_reliability_score
    }

    pub fn max_outliers(&self) -> usize {
        self.max_outliers
    }

    pub fn max_gaps(&self) -> usize {
        self.max_gaps
    }

    pub fn max_duplicates(&self) -> usize {
        self.max_duplicates
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_missing_data: true,
            check_outliers: true,
            check_gaps: true,
            check_splits: true,
            check_duplicates: true,
            missing_data_threshold: 0.05,
            outlier_method: OutlierMethod::ZScore,
            outlier_threshold: 3.0,
            max_gap_days: 5,
            split_threshold: 0.40,
            min_reliability_score: 0.80,
            max_outliers: 10,
            max_gaps: 5,
            max_duplicates: 0,
        }
    }
}

/// Unchecked validator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfigBuilder {
    pub check_missing_data: bool,
    pub check_outliers: bool,
    pub check_gaps: bool,
    pub check_splits: bool,
    pub check_duplicates: bool,
    pub missing_data_threshold: f64,
    pub outlier_method: OutlierMethod,
    pub outlier_threshold: f64,
    pub max_gap_days: i64,
    pub split_threshold: f64,
    pub min_reliability_score: f64,
    pub max_outliers: usize,
    pub max_gaps: usize,
    pub max_duplicates: usize,
}

impl ValidationConfigBuilder {
    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = method;
        self
    }

    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    pub fn max_gap_days(mut self, days: i64) -> Self {
        self.max_gap_days = days;
        self
    }

    pub fn split_threshold(mut self, threshold: f64) -> Self {
        self.split_threshold = threshold;
        self
    }

    pub fn missing_data_threshold(mut self, threshold: f64) -> Self {
        self.missing_data_threshold = threshold;
        self
    }

    /// Enable or disable every check at once.
    pub fn all_checks(mut self, enabled: bool) -> Self {
        self.check_missing_data = enabled;
        self.check_outliers = enabled;
        self.check_gaps = enabled;
        self.check_splits = enabled;
        self.check_duplicates = enabled;
        self
    }

    pub fn build(self) -> Result<ValidationConfig, ConfigError> {
        check_range("missing_data_threshold", self.missing_data_threshold, 0.0, 1.0)?;
        if !(self.outlier_threshold.is_finite() && self.outlier_threshold > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "outlier_threshold",
                value: self.outlier_threshold,
                min: f64::MIN_POSITIVE,
                max: 10.0,
            });
        }
        check_range("outlier_threshold", self.outlier_threshold, 0.0, 10.0)?;
        check_range("max_gap_days", self.max_gap_days as f64, 1.0, 365.0)?;
        if !(self.split_threshold.is_finite() && self.split_threshold > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "split_threshold",
                value: self.split_threshold,
                min: f64::MIN_POSITIVE,
                max: 1.0,
            });
        }
        check_range("split_threshold", self.split_threshold, 0.0, 1.0)?;
        check_range("min_reliability_score", self.min_reliability_score, 0.0, 1.0)?;

        Ok(ValidationConfig {
            check_missing_data: self.check_missing_data,
            check_outliers: self.check_outliers,
            check_gaps: self.check_gaps,
            check_splits: self.check_splits,
            check_duplicates: self.check_duplicates,
            missing_data_threshold: self.missing_data_threshold,
            outlier_method: self.outlier_method,
            outlier_threshold: self.outlier_threshold,
            max_gap_days: self.max_gap_days,
            split_threshold: self.split_threshold,
            min_reliability_score: self.min_reliability_score,
            max_outliers: self.max_outliers,
            max_gaps: self.max_gaps,
            max_duplicates: self.max_duplicates,
        })
    }
}

impl Default for ValidationConfigBuilder {
    fn default() -> Self {
        ValidationConfig::default().into()
    }
}

impl From<ValidationConfig> for ValidationConfigBuilder {
    fn from(c: ValidationConfig) -> Self {
        Self {
            check_missing_data: c.check_missing_data,
            check_outliers: c.check_outliers,
            check_gaps: c.check_gaps,
            check_splits: c.check_splits,
            check_duplicates: c.check_duplicates,
            missing_data_threshold: c.missing_data_threshold,
            outlier_method: c.outlier_method,
            outlier_threshold: c.outlier_threshold,
            max_gap_days: c.max_gap_days,
            split_threshold: c.split_threshold,
            min_reliability_score: c.min_reliability_score,
            max_outliers: c.max_outliers,
            max_gaps: c.max_gaps,
            max_duplicates: c.max_duplicates,
        }
    }
}

impl TryFrom<ValidationConfigBuilder> for ValidationConfig {
    type Error = ConfigError;

    fn try_from(builder: ValidationConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ValidationConfig::builder().build().unwrap(), ValidationConfig::default());
    }

    #[test]
    fn zero_outlier_threshold_rejected() {
        assert!(matches!(
            ValidationConfig::builder().outlier_threshold(0.0).build(),
            Err(ConfigError::OutOfRange { field: "outlier_threshold", .. })
        ));
    }

    #[test]
    fn split_threshold_bounds() {
        assert!(ValidationConfig::builder().split_threshold(1.0).build().is_ok());
        assert!(ValidationConfig::builder().split_threshold(0.0).build().is_err());
        assert!(ValidationConfig::builder().split_threshold(1.5).build().is_err());
    }

    #[test]
    fn gap_days_bounds() {
        assert!(ValidationConfig::builder().max_gap_days(0).build().is_err());
        assert!(ValidationConfig::builder().max_gap_days(365).build().is_ok());
    }

    #[test]
    fn all_checks_toggle() {
        let cfg = ValidationConfig::builder().all_checks(false).build().unwrap();
        assert!(!cfg.check_missing_data());
        assert!(!cfg.check_outliers());
        assert!(!cfg.check_gaps());
        assert!(!cfg.check_splits());
        assert!(!cfg.check_duplicates());
    }
}
