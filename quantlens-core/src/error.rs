//! Error taxonomy shared by every engine.
//!
//! Two terminal error families exist:
//! - [`ValidationError`]: the price data itself is malformed or too short.
//! - [`ConfigError`]: a configuration object violates its own invariants.
//!
//! Non-fatal numeric anomalies are not errors; they travel with the output as
//! [`crate::diagnostics::Diagnostic`] entries.

use chrono::NaiveDate;
use thiserror::Error;

/// Malformed or insufficient input data. Raised before any computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("price series has no data points")]
    Empty,

    #[error("price series ticker must not be empty")]
    EmptyTicker,

    #[error("length mismatch in `{field}`: expected {expected} values (one per date), got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("non-positive price in `{field}` at index {index}: {value}")]
    NonPositivePrice {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("non-finite value in `{field}` at index {index}")]
    NonFiniteValue { field: &'static str, index: usize },

    #[error("negative volume at index {index}: {value}")]
    NegativeVolume { index: usize, value: f64 },

    #[error(
        "dates are not in chronological order: {current} at index {index} comes before preceding date {previous}"
    )]
    NotChronological {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid date `{value}` at index {index}")]
    InvalidDate { index: usize, value: String },

    #[error("duplicate date {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("high below low at index {index}: high={high}, low={low}")]
    HighBelowLow { index: usize, high: f64, low: f64 },

    #[error("insufficient data for {indicator}: requires at least {required} points, got {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },
}

/// Invalid parameter combination, detected when a config object is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("MACD fast period ({fast}) must be strictly less than slow period ({slow})")]
    FastNotBelowSlow { fast: usize, slow: usize },

    #[error("crossover requires two distinct periods, both are {period}")]
    IdenticalPeriods { period: usize },

    #[error("crossover fast period ({fast}) must be shorter than slow period ({slow})")]
    CrossoverOrder { fast: usize, slow: usize },

    #[error("`{field}` thresholds invalid: oversold {oversold} must be below overbought {overbought}")]
    InvalidThresholds {
        field: &'static str,
        oversold: f64,
        overbought: f64,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to read configuration file: {0}")]
    Io(String),
}

/// Umbrella error for callers that handle both families in one place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Check `value ∈ [min, max]`, producing a [`ConfigError::OutOfRange`] otherwise.
pub(crate) fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Integer variant of [`check_range`].
pub(crate) fn check_period(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    check_range(field, value as f64, min as f64, max as f64)
}

/// Reject a computation when fewer than `required` points are available.
pub(crate) fn require_len(indicator: &'static str, required: usize, actual: usize) -> Result<(), ValidationError> {
    if actual < required {
        Err(ValidationError::InsufficientData {
            indicator,
            required,
            actual,
        })
    } else {
        Ok(())
    }
}
