//! Stochastic Oscillator (%K / %D).
//!
//! %K = 100 * (close - lowest_low) / (highest_high - lowest_low) over k bars
//! %D = SMA(%K, d)
//!
//! Highs/lows fall back to close for close-only series. The window extremes
//! also include the closes, so %K stays within [0, 100] even when a close
//! prints outside its bar's range. A window with zero range yields the
//! sentinel 50.
//!
//! Lookback: k - 1 for %K, k + d - 2 for %D.

use super::sma::sma_of_series;
use super::{after_warmup, Indicator};
use crate::diagnostics::ZERO_EPSILON;
use crate::domain::PriceSeries;

/// %K value substituted when the window's high equals its low.
pub const STOCHASTIC_ZERO_RANGE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize, line: StochasticLine) -> Self {
        assert!(k_period >= 1 && d_period >= 1, "Stochastic periods must be >= 1");
        let suffix = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            k_period,
            d_period,
            line,
            name: format!("stoch_{k_period}_{d_period}_{suffix}"),
        }
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            StochasticLine::K => self.k_period - 1,
            StochasticLine::D => self.k_period + self.d_period - 2,
        }
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        let k = percent_k(series, self.k_period);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => percent_d(&k, self.d_period),
        }
    }
}

/// Highest high and lowest low over the `period` bars ending at `end`.
pub(crate) fn window_extremes(series: &PriceSeries, end: usize, period: usize) -> (f64, f64) {
    let start = (end + 1).saturating_sub(period);
    let highs = series.highs_or_close();
    let lows = series.lows_or_close();
    let closes = series.closes();

    let mut highest = f64::NEG_INFINITY;
    let mut lowest = f64::INFINITY;
    for i in start..=end {
        highest = highest.max(highs[i]).max(closes[i]);
        lowest = lowest.min(lows[i]).min(closes[i]);
    }
    (highest, lowest)
}

/// True when the window ending at `end` has no price range.
pub(crate) fn is_zero_range(series: &PriceSeries, end: usize, period: usize) -> bool {
    let (highest, lowest) = window_extremes(series, end, period);
    highest - lowest < ZERO_EPSILON
}

pub fn percent_k(series: &PriceSeries, period: usize) -> Vec<f64> {
    let n = series.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let closes = series.closes();
    for i in (period - 1)..n {
        let (highest, lowest) = window_extremes(series, i, period);
        let range = highest - lowest;
        result[i] = if range < ZERO_EPSILON {
            STOCHASTIC_ZERO_RANGE
        } else {
            100.0 * (closes[i] - lowest) / range
        };
    }

    result
}

pub fn percent_d(percent_k: &[f64], period: usize) -> Vec<f64> {
    after_warmup(percent_k, |v| sma_of_series(v, period))
}
