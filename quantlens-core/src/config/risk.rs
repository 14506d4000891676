//! Risk engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{check_period, check_range, ConfigError};

/// Below this confidence level the engine attaches a diagnostic.
pub const RECOMMENDED_MIN_CONFIDENCE: f64 = 0.90;

/// Minimum number of prices the risk engine accepts.
pub const MIN_RISK_POINTS: usize = 30;

/// Largest trailing window of returns (three trading years).
pub const MAX_ROLLING_WINDOW: usize = 756;

/// How VaR is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    /// Empirical percentile of observed returns.
    Historical,
    /// `mean - z * stdev`, assuming normally distributed returns.
    Parametric,
}

/// How daily returns are derived from consecutive closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Simple,
    Log,
}

/// Validated risk configuration. Build through [`RiskConfigBuilder`] or
/// [`RiskConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RiskConfigBuilder", into = "RiskConfigBuilder")]
pub struct RiskConfig {
    confidence_level: f64,
    risk_free_rate: f64,
    rolling_window: usize,
    var_method: VarMethod,
    return_type: ReturnType,
}

impl RiskConfig {
    pub fn builder() -> RiskConfigBuilder {
        RiskConfigBuilder::default()
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Annual risk-free rate as a fraction.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Number of trailing returns used.
    pub fn rolling_window(&self) -> usize {
        self.rolling_window
    }

    pub fn var_method(&self) -> VarMethod {
        self.var_method
    }

    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            risk_free_rate: 0.02,
            rolling_window: 252,
            var_method: VarMethod::Historical,
            return_type: ReturnType::Simple,
        }
    }
}

/// Unchecked risk parameters; `build` enforces every range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskConfigBuilder {
    pub confidence_level: f64,
    pub risk_free_rate: f64,
    pub rolling_window: usize,
    pub var_method: VarMethod,
    pub return_type: ReturnType,
}

impl RiskConfigBuilder {
    pub fn confidence_level(mut self, value: f64) -> Self {
        self.confidence_level = value;
        self
    }

    pub fn risk_free_rate(mut self, value: f64) -> Self {
        self.risk_free_rate = value;
        self
    }

    pub fn rolling_window(mut self, value: usize) -> Self {
        self.rolling_window = value;
        self
    }

    pub fn var_method(mut self, value: VarMethod) -> Self {
        self.var_method = value;
        self
    }

    pub fn return_type(mut self, value: ReturnType) -> Self {
        self.return_type = value;
        self
    }

    pub fn build(self) -> Result<RiskConfig, ConfigError> {
        check_range("confidence_level", self.confidence_level, 0.50, 0.99)?;
        check_range("risk_free_rate", self.risk_free_rate, 0.0, 0.20)?;
        check_period("rolling_window", self.rolling_window, MIN_RISK_POINTS, MAX_ROLLING_WINDOW)?;
        Ok(RiskConfig {
            confidence_level: self.confidence_level,
            risk_free_rate: self.risk_free_rate,
            rolling_window: self.rolling_window,
            var_method: self.var_method,
            return_type: self.return_type,
        })
    }
}

impl Default for RiskConfigBuilder {
    fn default() -> Self {
        RiskConfig::default().into()
    }
}

impl From<RiskConfig> for RiskConfigBuilder {
    fn from(c: RiskConfig) -> Self {
        Self {
            confidence_level: c.confidence_level,
            risk_free_rate: c.risk_free_rate,
            rolling_window: c.rolling_window,
            var_method: c.var_method,
            return_type: c.return_type,
        }
    }
}

impl TryFrom<RiskConfigBuilder> for RiskConfig {
    type Error = ConfigError;

    fn try_from(builder: RiskConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
