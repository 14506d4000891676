//! QuantLens Core: price series validation and quantitative indicator engines.
//!
//! This crate contains the calculation subsystem:
//! - Validated price series and categorical signal types
//! - Immutable, range-checked configuration objects
//! - Series-level indicator math behind the `Indicator` trait
//! - Four independent, stateless engines: validation, risk, momentum and
//!   moving averages
//!
//! Engines take an immutable series plus a config and return a serializable
//! report. Terminal problems are typed errors; numeric anomalies travel with
//! the report as diagnostics.

pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod momentum;
pub mod moving_average;
pub mod risk;
pub mod stats;
pub mod validation;

pub use config::AnalysisConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Metric, UndefinedReason};
pub use domain::{PriceSeries, PriceSeriesRecord};
pub use error::{ConfigError, QuantError, ValidationError};
pub use momentum::MomentumIndicatorEngine;
pub use moving_average::MovingAverageEngine;
pub use risk::RiskMetricsEngine;
pub use validation::PriceSeriesValidator;
