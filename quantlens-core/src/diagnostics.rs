//! Non-fatal numeric anomalies and the undefined-value policy.
//!
//! Every engine follows the same rule: a scalar whose denominator vanishes is
//! reported as [`Metric::Undefined`] with a reason, and a matching
//! [`Diagnostic`] is attached to the output. NaN and infinity never reach a
//! report.

use serde::{Deserialize, Serialize};

/// Denominators below this magnitude are treated as zero.
pub const ZERO_EPSILON: f64 = 1e-12;

/// Why a metric could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// Return standard deviation is zero.
    ZeroVolatility,
    /// Fewer than two returns fell below the target, or their spread is zero.
    NoDownside,
    /// The series never drew down.
    ZeroDrawdown,
    /// Benchmark returns have zero variance.
    ZeroBenchmarkVariance,
    /// No benchmark series was supplied.
    NoBenchmark,
    /// Asset and benchmark share too few dates.
    InsufficientOverlap,
    /// Highest high equals lowest low over the lookback window.
    ZeroPriceRange,
    /// Too few defined values for the lookback this metric needs.
    InsufficientHistory,
    /// The moving average used as a denominator is zero.
    ZeroAverage,
    /// The value exceeds the floating-point range.
    Overflow,
}

impl UndefinedReason {
    pub fn describe(&self) -> &'static str {
        match self {
            UndefinedReason::ZeroVolatility => "zero return volatility",
            UndefinedReason::NoDownside => "no downside returns",
            UndefinedReason::ZeroDrawdown => "no drawdown observed",
            UndefinedReason::ZeroBenchmarkVariance => "zero benchmark variance",
            UndefinedReason::NoBenchmark => "no benchmark supplied",
            UndefinedReason::InsufficientOverlap => "insufficient overlapping dates with benchmark",
            UndefinedReason::ZeroPriceRange => "zero high-low range",
            UndefinedReason::InsufficientHistory => "insufficient history",
            UndefinedReason::ZeroAverage => "moving average is zero",
            UndefinedReason::Overflow => "value overflows the floating-point range",
        }
    }
}

/// A numeric output that is either a finite value or explicitly undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric {
    Defined { value: f64 },
    Undefined { reason: UndefinedReason },
}

impl Metric {
    /// Wrap a value; non-finite input collapses to `Undefined` with `fallback`.
    pub fn from_value(value: f64, fallback: UndefinedReason) -> Self {
        if value.is_finite() {
            Metric::Defined { value }
        } else {
            Metric::Undefined { reason: fallback }
        }
    }

    pub fn undefined(reason: UndefinedReason) -> Self {
        Metric::Undefined { reason }
    }

    /// `numerator / denominator`, undefined when the denominator is ~0.
    pub fn ratio(numerator: f64, denominator: f64, reason: UndefinedReason) -> Self {
        if denominator.abs() < ZERO_EPSILON || !denominator.is_finite() {
            return Metric::Undefined { reason };
        }
        Metric::from_value(numerator / denominator, reason)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Defined { value } => Some(*value),
            Metric::Undefined { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<UndefinedReason> {
        match self {
            Metric::Defined { .. } => None,
            Metric::Undefined { reason } => Some(*reason),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined { .. })
    }
}

/// Category of a non-fatal anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// CVaR came out less extreme than VaR.
    CvarLessExtremeThanVar,
    /// Confidence level is below the recommended floor.
    LowConfidenceLevel,
    /// A metric was reported as undefined.
    UndefinedMetric,
    /// Benchmark and asset dates only partially overlap.
    PartialBenchmarkOverlap,
    /// High/low arrays absent; close used as the range proxy.
    MissingHighLow,
}

/// A warning attached to an otherwise valid output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Collects diagnostics for one engine call and mirrors them to the log.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticSink {
    ticker: String,
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub(crate) fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(ticker = %self.ticker, kind = ?kind, "{message}");
        self.entries.push(Diagnostic::new(kind, message));
    }

    /// Record an `UndefinedMetric` diagnostic if `metric` is undefined.
    pub(crate) fn check(&mut self, name: &str, metric: &Metric) {
        if let Metric::Undefined { reason } = metric {
            self.push(
                DiagnosticKind::UndefinedMetric,
                format!("{name} undefined: {}", reason.describe()),
            );
        }
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
