//! Configuration value objects.
//!
//! Each config is an immutable value with private fields, built through a
//! `*Builder` whose `build()` checks every range and cross-field invariant.
//! The builders double as the serde shape, so a config loaded from TOML or
//! JSON goes through exactly the same checks.

pub mod momentum;
pub mod moving_average;
pub mod risk;
pub mod validation;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use momentum::{MomentumConfig, MomentumConfigBuilder};
pub use moving_average::{
    CrossoverConfig, CrossoverConfigBuilder, MaType, MovingAverageConfig, MovingAverageConfigBuilder,
};
pub use risk::{ReturnType, RiskConfig, RiskConfigBuilder, VarMethod};
pub use validation::{OutlierMethod, ValidationConfig, ValidationConfigBuilder};

use crate::error::ConfigError;

/// All engine configs in one file, one TOML table per engine.
///
/// ```toml
/// [risk]
/// confidence_level = 0.99
/// var_method = "parametric"
///
/// [crossover]
/// fast_period = 20
/// slow_period = 50
/// ```
///
/// Missing tables and keys fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub validation: ValidationConfig,
    pub risk: RiskConfig,
    pub momentum: MomentumConfig,
    pub moving_average: MovingAverageConfig,
    pub crossover: CrossoverConfig,
}

impl AnalysisConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn partial_sections_override() {
        let cfg = AnalysisConfig::from_toml(
            r#"
            [risk]
            confidence_level = 0.99
            var_method = "parametric"

            [momentum]
            rsi_period = 21

            [crossover]
            fast_period = 20
            slow_period = 50
            "#,
        )
        .unwrap();
        assert_eq!(cfg.risk.confidence_level(), 0.99);
        assert_eq!(cfg.risk.var_method(), VarMethod::Parametric);
        assert_eq!(cfg.momentum.rsi_period(), 21);
        assert_eq!(cfg.crossover.fast().period(), 20);
        assert_eq!(cfg.validation, ValidationConfig::default());
    }

    #[test]
    fn invalid_section_is_a_config_error() {
        let err = AnalysisConfig::from_toml(
            r#"
            [momentum]
            macd_fast = 30
            macd_slow = 20
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Parse(msg) => assert!(msg.contains("MACD fast period")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(AnalysisConfig::from_toml("[risk]\nconfidence = 0.9\n").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = AnalysisConfig::default();
        let text = cfg.to_toml().unwrap();
        assert_eq!(AnalysisConfig::from_toml(&text).unwrap(), cfg);
    }
}
