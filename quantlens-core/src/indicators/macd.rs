//! Moving Average Convergence Divergence (MACD).
//!
//! MACD line = EMA(fast) - EMA(slow)
//! Signal    = EMA(signal) of the MACD line, seeded from its first defined value
//! Histogram = MACD line - signal
//!
//! Lookback: slow - 1 for the MACD line, slow + signal - 2 for signal and
//! histogram.

use super::ema::ema_of_series;
use super::{after_warmup, Indicator};
use crate::domain::PriceSeries;

/// Which of the three MACD series an instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be below slow period");
        let suffix = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{fast}_{slow}_{signal}_{suffix}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        let lines = macd_lines(series.closes(), self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => lines.macd,
            MacdLine::Signal => lines.signal,
            MacdLine::Histogram => lines.histogram,
        }
    }
}

/// All three MACD series, computed in one pass.
#[derive(Debug, Clone)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_lines(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdLines {
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);

    let macd: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| {
            if f.is_nan() || s.is_nan() {
                f64::NAN
            } else {
                f - s
            }
        })
        .collect();

    let signal_line = after_warmup(&macd, |v| ema_of_series(v, signal));

    let histogram = macd
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| {
            if m.is_nan() || s.is_nan() {
                f64::NAN
            } else {
                m - s
            }
        })
        .collect();

    MacdLines {
        macd,
        signal: signal_line,
        histogram,
    }
}
