//! Hull Moving Average (HMA).
//!
//! HMA = WMA(2 * WMA(close, period/2) - WMA(close, period), round(sqrt(period)))
//! `period/2` is integer division, floored at 1.
//! Lookback: period + round(sqrt(period)) - 2.

use super::wma::wma_of_series;
use super::{after_warmup, Indicator};
use crate::config::moving_average::hma_smoothing_period;
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Hma {
    period: usize,
    name: String,
}

impl Hma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "HMA period must be >= 1");
        Self {
            period,
            name: format!("hma_{period}"),
        }
    }
}

impl Indicator for Hma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + hma_smoothing_period(self.period) - 2
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        hma_of_series(series.closes(), self.period)
    }
}

pub fn hma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let half = wma_of_series(values, (period / 2).max(1));
    let full = wma_of_series(values, period);

    let raw: Vec<f64> = half
        .iter()
        .zip(full.iter())
        .map(|(h, f)| {
            if h.is_nan() || f.is_nan() {
                f64::NAN
            } else {
                2.0 * h - f
            }
        })
        .collect();

    let smoothing = hma_smoothing_period(period);
    after_warmup(&raw, |v| wma_of_series(v, smoothing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn hma_warmup_length() {
        // period 16: sqrt = 4, first value at 16 + 4 - 2 = 18
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = Hma::new(16).compute(&make_series(&closes));
        assert!(result[17].is_nan());
        assert!(!result[18].is_nan());
        assert_eq!(Hma::new(16).lookback(), 18);
    }

    #[test]
    fn hma_tracks_linear_trend_exactly() {
        // On a straight line the Hull construction removes the WMA lag.
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + 2.0 * i as f64).collect();
        let result = hma_of_series(&closes, 9);
        assert_approx(result[39], closes[39], 1e-9);
    }

    #[test]
    fn hma_constant() {
        let result = hma_of_series(&[42.0; 30], 10);
        assert_approx(result[29], 42.0, DEFAULT_EPSILON);
    }

    #[test]
    fn hma_period_2_uses_half_of_one() {
        let closes = [10.0, 12.0, 11.0, 13.0];
        let result = hma_of_series(&closes, 2);
        // half = WMA(1) = close, full = WMA(2), smoothing = round(sqrt 2) = 1
        let full = wma_of_series(&closes, 2);
        assert_approx(result[3], 2.0 * 13.0 - full[3], DEFAULT_EPSILON);
    }
}
