//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses, seeded with the
//! simple average of the first `period` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: both averages zero → 50; avg_loss == 0 → 100; avg_gain == 0 → 0.

use super::Indicator;
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        wilder_rsi(series.closes(), self.period).values
    }
}

/// RSI series plus the smoothed averages at the last bar.
#[derive(Debug, Clone)]
pub struct WilderRsi {
    pub values: Vec<f64>,
    pub avg_gain: f64,
    pub avg_loss: f64,
}

pub fn wilder_rsi(closes: &[f64], period: usize) -> WilderRsi {
    let n = closes.len();
    let mut result = WilderRsi {
        values: vec![f64::NAN; n],
        avg_gain: f64::NAN,
        avg_loss: f64::NAN,
    };

    if period == 0 || n < period + 1 {
        return result;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let ch = closes[i] - closes[i - 1];
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result.values[period] = rsi_from_averages(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let ch = closes[i] - closes[i - 1];
        let gain = ch.max(0.0);
        let loss = (-ch).max(0.0);

        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

        result.values[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    result.avg_gain = avg_gain;
    result.avg_loss = avg_loss;
    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series};

    #[test]
    fn rsi_all_gains() {
        let series = make_series(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&series);
        assert_approx(result[3], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let series = make_series(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&series);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_flat_is_fifty() {
        let series = make_series(&[100.0; 20]);
        let result = Rsi::new(14).compute(&series);
        assert_approx(result[14], 50.0, 1e-12);
        assert_approx(result[19], 50.0, 1e-12);
    }

    #[test]
    fn rsi_seed_value() {
        // Changes: +0.34, -0.25, -0.48
        // avg_gain = 0.34/3, avg_loss = 0.73/3
        // RSI[3] = 100 - 100/(1 + 0.34/0.73)
        let series = make_series(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let out = wilder_rsi(series.closes(), 3);

        assert!(out.values[..3].iter().all(|v| v.is_nan()));
        assert_approx(out.values[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);

        // Wilder step: gain 0.72 enters with weight 1/3
        let g = (2.0 * 0.34 / 3.0 + 0.72) / 3.0;
        let l = (2.0 * 0.73 / 3.0) / 3.0;
        assert_approx(out.avg_gain, g, 1e-9);
        assert_approx(out.avg_loss, l, 1e-9);
        assert_approx(out.values[4], 100.0 - 100.0 / (1.0 + g / l), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let series = make_series(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&series);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_too_short_is_all_nan() {
        let out = wilder_rsi(&[1.0, 2.0, 3.0], 3);
        assert!(out.values.iter().all(|v| v.is_nan()));
        assert!(out.avg_gain.is_nan());
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
