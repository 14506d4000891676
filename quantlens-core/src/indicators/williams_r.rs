//! Williams %R.
//!
//! %R = -100 * (highest_high - close) / (highest_high - lowest_low)
//! Range is [-100, 0]. Zero-range windows yield the sentinel -50.
//! Lookback: period - 1.

use super::stochastic::window_extremes;
use super::Indicator;
use crate::diagnostics::ZERO_EPSILON;
use crate::domain::PriceSeries;

/// %R value substituted when the window's high equals its low.
pub const WILLIAMS_ZERO_RANGE: f64 = -50.0;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("williams_r_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        let n = series.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let closes = series.closes();
        for i in (self.period - 1)..n {
            let (highest, lowest) = window_extremes(series, i, self.period);
            let range = highest - lowest;
            result[i] = if range < ZERO_EPSILON {
                WILLIAMS_ZERO_RANGE
            } else {
                -100.0 * (highest - closes[i]) / range
            };
        }

        result
    }
}
