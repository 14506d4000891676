//! Momentum engine configuration: periods and signal thresholds for all five
//! oscillators.

use serde::{Deserialize, Serialize};

use crate::error::{check_period, ConfigError};

/// Validated momentum configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MomentumConfigBuilder", into = "MomentumConfigBuilder")]
pub struct MomentumConfig {
    rsi_period: usize,
    rsi_overbought: f64,
    rsi_oversold: f64,
    macd_fast: usize,
    macd_slow: usize,
    macd_signal: usize,
    stoch_k_period: usize,
    stoch_d_period: usize,
    stoch_overbought: f64,
    stoch_oversold: f64,
    williams_period: usize,
    williams_overbought: f64,
    williams_oversold: f64,
    roc_period: usize,
}

impl MomentumConfig {
    pub fn builder() -> MomentumConfigBuilder {
        MomentumConfigBuilder::default()
    }

    pub fn rsi_period(&self) -> usize {
        self.rsi_period
    }

    pub fn rsi_thresholds(&self) -> (f64, f64) {
        (self.rsi_overbought, self.rsi_oversold)
    }

    pub fn macd_periods(&self) -> (usize, usize, usize) {
        (self.macd_fast, self.macd_slow, self.macd_signal)
    }

    pub fn stochastic_periods(&self) -> (usize, usize) {
        (self.stoch_k_period, self.stoch_d_period)
    }

    pub fn stochastic_thresholds(&self) -> (f64, f64) {
        (self.stoch_overbought, self.stoch_oversold)
    }

    pub fn williams_period(&self) -> usize {
        self.williams_period
    }

    pub fn williams_thresholds(&self) -> (f64, f64) {
        (self.williams_overbought, self.williams_oversold)
    }

    pub fn roc_period(&self) -> usize {
        self.roc_period
    }

    // Minimum history lengths. Each indicator needs one point beyond its
    // window; MACD and Stochastic additionally need their smoothing windows
    // filled so the signal line / %D has at least one value.

    pub fn rsi_required(&self) -> usize {
        self.rsi_period + 1
    }

    pub fn macd_required(&self) -> usize {
        self.macd_slow + self.macd_signal
    }

    pub fn stochastic_required(&self) -> usize {
        self.stoch_k_period + self.stoch_d_period
    }

    pub fn williams_required(&self) -> usize {
        self.williams_period + 1
    }

    pub fn roc_required(&self) -> usize {
        self.roc_period + 1
    }

    /// History needed to compute all five indicators in one call.
    pub fn all_required(&self) -> usize {
        [
            self.rsi_required(),
            self.macd_required(),
            self.stochastic_required(),
            self.williams_required(),
            self.roc_required(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stoch_k_period: 14,
            stoch_d_period: 3,
            stoch_overbought: 80.0,
            stoch_oversold: 20.0,
            williams_period: 14,
            williams_overbought: -20.0,
            williams_oversold: -80.0,
            roc_period: 12,
        }
    }
}

/// Unchecked momentum parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MomentumConfigBuilder {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    pub stoch_overbought: f64,
    pub stoch_oversold: f64,
    pub williams_period: usize,
    pub williams_overbought: f64,
    pub williams_oversold: f64,
    pub roc_period: usize,
}

impl MomentumConfigBuilder {
    pub fn rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = period;
        self
    }

    pub fn macd(mut self, fast: usize, slow: usize, signal: usize) -> Self {
        self.macd_fast = fast;
        self.macd_slow = slow;
        self.macd_signal = signal;
        self
    }

    pub fn stochastic(mut self, k_period: usize, d_period: usize) -> Self {
        self.stoch_k_period = k_period;
        self.stoch_d_period = d_period;
        self
    }

    pub fn williams_period(mut self, period: usize) -> Self {
        self.williams_period = period;
        self
    }

    pub fn roc_period(mut self, period: usize) -> Self {
        self.roc_period = period;
        self
    }

    pub fn build(self) -> Result<MomentumConfig, ConfigError> {
        check_period("rsi_period", self.rsi_period, 2, 100)?;
        check_thresholds("rsi", self.rsi_oversold, self.rsi_overbought, 0.0, 100.0)?;

        check_period("macd_fast", self.macd_fast, 2, 100)?;
        check_period("macd_slow", self.macd_slow, 3, 200)?;
        check_period("macd_signal", self.macd_signal, 2, 50)?;
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::FastNotBelowSlow {
                fast: self.macd_fast,
                slow: self.macd_slow,
            });
        }

        check_period("stoch_k_period", self.stoch_k_period, 2, 100)?;
        check_period("stoch_d_period", self.stoch_d_period, 1, 20)?;
        check_thresholds("stochastic", self.stoch_oversold, self.stoch_overbought, 0.0, 100.0)?;

        check_period("williams_period", self.williams_period, 2, 100)?;
        check_thresholds(
            "williams_r",
            self.williams_oversold,
            self.williams_overbought,
            -100.0,
            0.0,
        )?;

        check_period("roc_period", self.roc_period, 1, 100)?;

        Ok(MomentumConfig {
            rsi_period: self.rsi_period,
            rsi_overbought: self.rsi_overbought,
            rsi_oversold: self.rsi_oversold,
            macd_fast: self.macd_fast,
            macd_slow: self.macd_slow,
            macd_signal: self.macd_signal,
            stoch_k_period: self.stoch_k_period,
            stoch_d_period: self.stoch_d_period,
            stoch_overbought: self.stoch_overbought,
            stoch_oversold: self.stoch_oversold,
            williams_period: self.williams_period,
            williams_overbought: self.williams_overbought,
            williams_oversold: self.williams_oversold,
            roc_period: self.roc_period,
        })
    }
}

/// Thresholds must sit strictly inside the oscillator's scale, oversold below overbought.
fn check_thresholds(
    field: &'static str,
    oversold: f64,
    overbought: f64,
    lo: f64,
    hi: f64,
) -> Result<(), ConfigError> {
    let inside = |v: f64| v.is_finite() && v > lo && v < hi;
    if !inside(oversold) || !inside(overbought) || oversold >= overbought {
        return Err(ConfigError::InvalidThresholds {
            field,
            oversold,
            overbought,
        });
    }
    Ok(())
}

impl Default for MomentumConfigBuilder {
    fn default() -> Self {
        MomentumConfig::default().into()
    }
}

impl From<MomentumConfig> for MomentumConfigBuilder {
    fn from(c: MomentumConfig) -> Self {
        Self {
            rsi_period: c.rsi_period,
            rsi_overbought: c.rsi_overbought,
            rsi_oversold: c.rsi_oversold,
            macd_fast: c.macd_fast,
            macd_slow: c.macd_slow,
            macd_signal: c.macd_signal,
            stoch_k_period: c.stoch_k_period,
            stoch_d_period: c.stoch_d_period,
            stoch_overbought: c.stoch_overbought,
            stoch_oversold: c.stoch_oversold,
            williams_period: c.williams_period,
            williams_overbought: c.williams_overbought,
            williams_oversold: c.williams_oversold,
            roc_period: c.roc_period,
        }
    }
}

impl TryFrom<MomentumConfigBuilder> for MomentumConfig {
    type Error = ConfigError;

    fn try_from(builder: MomentumConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
