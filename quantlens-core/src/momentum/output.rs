//! Momentum indicator outputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Metric};
use crate::domain::{DirectionSignal, IndicatorPoint, MacdSignal, OscillatorSignal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiOutput {
    pub ticker: String,
    pub date: NaiveDate,
    pub period: usize,
    /// Always within [0, 100].
    pub value: f64,
    pub signal: OscillatorSignal,
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub overbought: f64,
    pub oversold: f64,
    pub history: Vec<IndicatorPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub date: NaiveDate,
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    pub ticker: String,
    pub date: NaiveDate,
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
    pub signal: MacdSignal,
    /// Points where all three lines are defined.
    pub history: Vec<MacdPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    pub ticker: String,
    pub date: NaiveDate,
    pub k_period: usize,
    pub d_period: usize,
    /// Undefined when the latest window has no price range.
    pub percent_k: Metric,
    pub percent_d: Metric,
    pub signal: OscillatorSignal,
    pub overbought: f64,
    pub oversold: f64,
    /// Zero-range windows appear here as the sentinel 50.
    pub history_k: Vec<IndicatorPoint>,
    pub history_d: Vec<IndicatorPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WilliamsROutput {
    pub ticker: String,
    pub date: NaiveDate,
    pub period: usize,
    /// Within [-100, 0]; undefined when the latest window has no price range.
    pub value: Metric,
    pub signal: OscillatorSignal,
    pub overbought: f64,
    pub oversold: f64,
    /// Zero-range windows appear here as the sentinel -50.
    pub history: Vec<IndicatorPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocOutput {
    pub ticker: String,
    pub date: NaiveDate,
    pub period: usize,
    /// Percent change over `period` bars.
    pub value: f64,
    pub signal: DirectionSignal,
    pub history: Vec<IndicatorPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// All five indicators from one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumReport {
    pub ticker: String,
    pub date: NaiveDate,
    pub rsi: RsiOutput,
    pub macd: MacdOutput,
    pub stochastic: StochasticOutput,
    pub williams_r: WilliamsROutput,
    pub roc: RocOutput,
}
