//! Series-level indicator math.
//!
//! Every indicator implements [`Indicator`]: full price series in, a value
//! series of the same length out. The first `lookback()` values are
//! `f64::NAN` (warm-up). NaN never leaves the crate; the engines turn these
//! series into dated histories and [`crate::diagnostics::Metric`] scalars.
//!
//! Multi-line indicators (MACD, Stochastic) are exposed as separate instances
//! per line, keeping the single-series trait unchanged.
//!
//! # Look-ahead guard
//! No value at index t may depend on data from t+1 or later. Each indicator
//! is tested against a truncated series.

pub mod ema;
pub mod hma;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod williams_r;
pub mod wma;

pub use ema::Ema;
pub use hma::Hma;
pub use macd::{Macd, MacdLine};
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticLine};
pub use williams_r::WilliamsR;
pub use wma::Wma;

use crate::config::{MaType, MovingAverageConfig};
use crate::domain::PriceSeries;

/// Trait for indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_50", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading NaN values in the output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    fn compute(&self, series: &PriceSeries) -> Vec<f64>;
}

/// Build the moving average described by `config`.
pub fn moving_average(config: &MovingAverageConfig) -> Box<dyn Indicator> {
    let period = config.period();
    match config.ma_type() {
        MaType::Sma => Box::new(Sma::new(period)),
        MaType::Ema => Box::new(Ema::new(period)),
        MaType::Wma => Box::new(Wma::new(period)),
        MaType::Hma => Box::new(Hma::new(period)),
    }
}

/// Apply `f` to the part of `values` after its leading NaNs, re-padding the
/// result to full length. Used to smooth series that have their own warm-up
/// (MACD signal line, HMA final pass, %D).
pub(crate) fn after_warmup(values: &[f64], f: impl Fn(&[f64]) -> Vec<f64>) -> Vec<f64> {
    let n = values.len();
    let start = values.iter().position(|v| !v.is_nan()).unwrap_or(n);
    let mut result = vec![f64::NAN; start];
    result.extend(f(&values[start..]));
    result
}

#[cfg(test)]
pub(crate) fn make_series(closes: &[f64]) -> PriceSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let dates = (0..closes.len())
        .map(|i| base + chrono::Duration::days(i as i64))
        .collect();
    PriceSeries::new("TEST", dates, closes.to_vec()).unwrap()
}

/// Series with high = close + 1 and low = close - 1 (clamped positive).
#[cfg(test)]
pub(crate) fn make_range_series(closes: &[f64]) -> PriceSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let dates = (0..closes.len())
        .map(|i| base + chrono::Duration::days(i as i64))
        .collect();
    let high = closes.iter().map(|c| c + 1.0).collect();
    let low = closes.iter().map(|c| (c - 1.0).max(0.01)).collect();
    PriceSeries::with_range("TEST", dates, closes.to_vec(), high, low, None).unwrap()
}

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-10;
