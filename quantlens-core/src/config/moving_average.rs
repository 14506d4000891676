//! Moving-average and dual-MA crossover configuration.

use serde::{Deserialize, Serialize};

use crate::error::{check_period, check_range, ConfigError};

/// Moving average flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaType {
    Sma,
    Ema,
    Wma,
    Hma,
}

impl MaType {
    pub fn prefix(&self) -> &'static str {
        match self {
            MaType::Sma => "sma",
            MaType::Ema => "ema",
            MaType::Wma => "wma",
            MaType::Hma => "hma",
        }
    }
}

/// Validated single moving-average configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MovingAverageConfigBuilder", into = "MovingAverageConfigBuilder")]
pub struct MovingAverageConfig {
    period: usize,
    ma_type: MaType,
    at_tolerance: f64,
}

impl MovingAverageConfig {
    pub fn new(period: usize, ma_type: MaType) -> Result<Self, ConfigError> {
        MovingAverageConfigBuilder {
            period,
            ma_type,
            ..Default::default()
        }
        .build()
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn ma_type(&self) -> MaType {
        self.ma_type
    }

    /// Relative band around the MA inside which price counts as "AT".
    pub fn at_tolerance(&self) -> f64 {
        self.at_tolerance
    }

    /// Prices needed before the first MA value exists.
    pub fn required(&self) -> usize {
        match self.ma_type {
            MaType::Hma => self.period + hma_smoothing_period(self.period) - 1,
            _ => self.period,
        }
    }

    /// Short key like `sma_50`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.ma_type.prefix(), self.period)
    }
}

/// Final smoothing window of the Hull MA: `round(sqrt(period))`.
pub(crate) fn hma_smoothing_period(period: usize) -> usize {
    ((period as f64).sqrt().round() as usize).max(1)
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            period: 50,
            ma_type: MaType::Sma,
            at_tolerance: 0.001,
        }
    }
}

/// Unchecked moving-average parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovingAverageConfigBuilder {
    pub period: usize,
    pub ma_type: MaType,
    pub at_tolerance: f64,
}

impl MovingAverageConfigBuilder {
    pub fn build(self) -> Result<MovingAverageConfig, ConfigError> {
        check_period("period", self.period, 2, 500)?;
        check_range("at_tolerance", self.at_tolerance, 0.0, 0.05)?;
        Ok(MovingAverageConfig {
            period: self.period,
            ma_type: self.ma_type,
            at_tolerance: self.at_tolerance,
        })
    }
}

impl Default for MovingAverageConfigBuilder {
    fn default() -> Self {
        MovingAverageConfig::default().into()
    }
}

impl From<MovingAverageConfig> for MovingAverageConfigBuilder {
    fn from(c: MovingAverageConfig) -> Self {
        Self {
            period: c.period,
            ma_type: c.ma_type,
            at_tolerance: c.at_tolerance,
        }
    }
}

impl TryFrom<MovingAverageConfigBuilder> for MovingAverageConfig {
    type Error = ConfigError;

    fn try_from(builder: MovingAverageConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// Validated dual-MA crossover configuration: two distinct periods, fast first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CrossoverConfigBuilder", into = "CrossoverConfigBuilder")]
pub struct CrossoverConfig {
    fast: MovingAverageConfig,
    slow: MovingAverageConfig,
}

impl CrossoverConfig {
    pub fn new(fast: MovingAverageConfig, slow: MovingAverageConfig) -> Result<Self, ConfigError> {
        if fast.period == slow.period {
            return Err(ConfigError::IdenticalPeriods {
                period: fast.period,
            });
        }
        if fast.period > slow.period {
            return Err(ConfigError::CrossoverOrder {
                fast: fast.period,
                slow: slow.period,
            });
        }
        Ok(Self { fast, slow })
    }

    /// Convenience: both legs share one MA type.
    pub fn with_periods(fast: usize, slow: usize, ma_type: MaType) -> Result<Self, ConfigError> {
        Self::new(
            MovingAverageConfig::new(fast, ma_type)?,
            MovingAverageConfig::new(slow, ma_type)?,
        )
    }

    pub fn fast(&self) -> &MovingAverageConfig {
        &self.fast
    }

    pub fn slow(&self) -> &MovingAverageConfig {
        &self.slow
    }

    /// True for the classic 50/200 pair that gets golden/death cross labels.
    pub fn is_golden_death_pair(&self) -> bool {
        self.fast.period == 50 && self.slow.period == 200
    }

    pub fn required(&self) -> usize {
        self.fast.required().max(self.slow.required())
    }
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            fast: MovingAverageConfig {
                period: 50,
                ..MovingAverageConfig::default()
            },
            slow: MovingAverageConfig {
                period: 200,
                ..MovingAverageConfig::default()
            },
        }
    }
}

/// Unchecked crossover parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrossoverConfigBuilder {
    pub fast_period: usize,
    pub slow_period: usize,
    pub fast_type: MaType,
    pub slow_type: MaType,
}

impl CrossoverConfigBuilder {
    pub fn build(self) -> Result<CrossoverConfig, ConfigError> {
        CrossoverConfig::new(
            MovingAverageConfig::new(self.fast_period, self.fast_type)?,
            MovingAverageConfig::new(self.slow_period, self.slow_type)?,
        )
    }
}

impl Default for CrossoverConfigBuilder {
    fn default() -> Self {
        CrossoverConfig::default().into()
    }
}

impl From<CrossoverConfig> for CrossoverConfigBuilder {
    fn from(c: CrossoverConfig) -> Self {
        Self {
            fast_period: c.fast.period,
            slow_period: c.slow.period,
            fast_type: c.fast.ma_type,
            slow_type: c.slow.ma_type,
        }
    }
}

impl TryFrom<CrossoverConfigBuilder> for CrossoverConfig {
    type Error = ConfigError;

    fn try_from(builder: CrossoverConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
