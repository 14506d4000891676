//! Weighted Moving Average (WMA).
//!
//! Linearly increasing weights 1..=period, the most recent value weighted
//! highest, normalized by period * (period + 1) / 2.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    name: String,
}

impl Wma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "WMA period must be >= 1");
        Self {
            period,
            name: format!("wma_{period}"),
        }
    }
}

impl Indicator for Wma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        wma_of_series(series.closes(), self.period)
    }
}

pub fn wma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let denom = (period * (period + 1)) as f64 / 2.0;
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        let weighted: f64 = window
            .iter()
            .enumerate()
            .map(|(j, v)| (j + 1) as f64 * v)
            .sum();
        result[i] = weighted / denom;
    }

    result
}
