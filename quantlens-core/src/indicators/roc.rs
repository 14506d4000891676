//! Rate of Change (ROC).
//!
//! Percentage price change over N bars.
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Lookback: period.

use super::Indicator;
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        let closes = series.closes();
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        // Closes are strictly positive, so the base is never zero.
        for i in self.period..n {
            let prev = closes[i - self.period];
            result[i] = (closes[i] - prev) / prev * 100.0;
        }

        result
    }
}
