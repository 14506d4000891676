//! RiskMetricsEngine: loss and risk-adjusted return statistics.
//!
//! Works on the trailing `rolling_window + 1` prices of the series. Every
//! ratio whose denominator can vanish is reported as a [`Metric`]; VaR, CVaR
//! and drawdown are clamped to `<= 0`.

pub mod metrics;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::risk::{MIN_RISK_POINTS, RECOMMENDED_MIN_CONFIDENCE};
use crate::config::{ReturnType, RiskConfig, VarMethod};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Metric, UndefinedReason, ZERO_EPSILON};
use crate::domain::PriceSeries;
use crate::error::{require_len, ValidationError};
use crate::stats::{self, TRADING_DAYS_PER_YEAR};

/// Output of [`RiskMetricsEngine::compute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetricsReport {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Number of returns the statistics are based on.
    pub observations: usize,
    pub confidence_level: f64,
    pub var_method: VarMethod,
    pub return_type: ReturnType,

    /// Daily VaR at `confidence_level`, as a return (`<= 0`).
    pub value_at_risk: f64,
    /// Daily expected shortfall beyond VaR (`<= 0`).
    pub conditional_var: f64,

    pub sharpe_ratio: Metric,
    pub sortino_ratio: Metric,
    pub calmar_ratio: Metric,

    pub max_drawdown: f64,
    pub drawdown_peak_date: NaiveDate,
    pub drawdown_trough_date: NaiveDate,

    pub total_return: f64,
    pub annualized_return: Metric,
    pub annual_volatility: f64,
    pub mean_daily_return: f64,
    pub best_day: f64,
    pub worst_day: f64,
    pub skewness: Metric,
    pub excess_kurtosis: Metric,

    pub benchmark: BenchmarkComparison,
    pub diagnostics: Vec<Diagnostic>,
}

/// Asset-versus-benchmark statistics over the shared dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Returns computed over dates present in both series.
    pub overlapping_returns: usize,
    pub beta: Metric,
    pub alpha: Metric,
    pub correlation: Metric,
}

impl BenchmarkComparison {
    fn absent() -> Self {
        Self {
            ticker: None,
            overlapping_returns: 0,
            beta: Metric::undefined(UndefinedReason::NoBenchmark),
            alpha: Metric::undefined(UndefinedReason::NoBenchmark),
            correlation: Metric::undefined(UndefinedReason::NoBenchmark),
        }
    }
}

pub struct RiskMetricsEngine;

impl RiskMetricsEngine {
    pub fn compute(
        series: &PriceSeries,
        benchmark: Option<&PriceSeries>,
        config: &RiskConfig,
    ) -> Result<RiskMetricsReport, ValidationError> {
        require_len("risk metrics", MIN_RISK_POINTS, series.len())?;
        tracing::debug!(
            ticker = series.ticker(),
            points = series.len(),
            window = config.rolling_window(),
            benchmark = benchmark.map(|b| b.ticker()),
            "computing risk metrics"
        );

        let window = series.tail(config.rolling_window() + 1);
        let prices = window.closes();
        let dates = window.dates();
        let confidence = config.confidence_level();
        let mut sink = DiagnosticSink::new(series.ticker());

        if confidence < RECOMMENDED_MIN_CONFIDENCE {
            sink.push(
                DiagnosticKind::LowConfidenceLevel,
                format!(
                    "confidence level {confidence} is below the recommended {RECOMMENDED_MIN_CONFIDENCE}"
                ),
            );
        }

        let returns = metrics::returns(prices, config.return_type());
        let n = returns.len();
        let mean = stats::mean(&returns).unwrap_or(0.0);
        let std = stats::sample_std_dev(&returns).unwrap_or(0.0);

        let raw_var = metrics::value_at_risk(&returns, confidence, config.var_method()).unwrap_or(0.0);
        let raw_cvar =
            metrics::conditional_var(&returns, raw_var, confidence, config.var_method()).unwrap_or(raw_var);
        let value_at_risk = raw_var.min(0.0);
        let conditional_var = raw_cvar.min(0.0);
        if conditional_var > value_at_risk {
            sink.push(
                DiagnosticKind::CvarLessExtremeThanVar,
                format!("CVaR {conditional_var:.6} is less extreme than VaR {value_at_risk:.6}"),
            );
        }

        let daily_rf = config.risk_free_rate() / TRADING_DAYS_PER_YEAR;
        let excess_mean = mean - daily_rf;
        let annualizer = TRADING_DAYS_PER_YEAR.sqrt();
        let flat = std < ZERO_EPSILON;

        let sharpe_ratio = if flat {
            Metric::undefined(UndefinedReason::ZeroVolatility)
        } else {
            Metric::ratio(excess_mean * annualizer, std, UndefinedReason::ZeroVolatility)
        };
        let sortino_ratio = if flat {
            Metric::undefined(UndefinedReason::ZeroVolatility)
        } else {
            metrics::downside_deviation(&returns, daily_rf)
                .map_or(Metric::undefined(UndefinedReason::NoDownside), |dd| {
                    Metric::ratio(excess_mean * annualizer, dd, UndefinedReason::NoDownside)
                })
        };

        let drawdown = metrics::max_drawdown(prices);
        let total_return = window.last_close() / prices[0] - 1.0;
        let annualized_return = Metric::from_value(
            metrics::annualized_return(prices[0], window.last_close(), n),
            UndefinedReason::Overflow,
        );
        let calmar_ratio = match annualized_return.value() {
            Some(annual) => Metric::ratio(annual, drawdown.max_drawdown.abs(), UndefinedReason::ZeroDrawdown),
            None => annualized_return,
        };

        let skewness = stats::skewness(&returns)
            .map_or(Metric::undefined(UndefinedReason::ZeroVolatility), |v| {
                Metric::from_value(v, UndefinedReason::ZeroVolatility)
            });
        let excess_kurtosis = stats::excess_kurtosis(&returns)
            .map_or(Metric::undefined(UndefinedReason::ZeroVolatility), |v| {
                Metric::from_value(v, UndefinedReason::ZeroVolatility)
            });

        let benchmark = match benchmark {
            Some(b) => compare_benchmark(&window, b, config.return_type(), &mut sink),
            None => BenchmarkComparison::absent(),
        };

        for (name, metric) in [
            ("sharpe_ratio", &sharpe_ratio),
            ("sortino_ratio", &sortino_ratio),
            ("calmar_ratio", &calmar_ratio),
            ("annualized_return", &annualized_return),
            ("skewness", &skewness),
            ("excess_kurtosis", &excess_kurtosis),
            ("beta", &benchmark.beta),
            ("alpha", &benchmark.alpha),
            ("correlation", &benchmark.correlation),
        ] {
            if metric.reason() != Some(UndefinedReason::NoBenchmark) {
                sink.check(name, metric);
            }
        }

        Ok(RiskMetricsReport {
            ticker: series.ticker().to_string(),
            start_date: window.first_date(),
            end_date: window.last_date(),
            observations: n,
            confidence_level: confidence,
            var_method: config.var_method(),
            return_type: config.return_type(),
            value_at_risk,
            conditional_var,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            max_drawdown: drawdown.max_drawdown,
            drawdown_peak_date: dates[drawdown.peak_index],
            drawdown_trough_date: dates[drawdown.trough_index],
            total_return,
            annualized_return,
            annual_volatility: metrics::annual_volatility(std),
            mean_daily_return: mean,
            best_day: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_day: returns.iter().copied().fold(f64::INFINITY, f64::min),
            skewness,
            excess_kurtosis,
            benchmark,
            diagnostics: sink.into_vec(),
        })
    }
}

/// Align the benchmark to the asset window by date and compare returns.
fn compare_benchmark(
    window: &PriceSeries,
    benchmark: &PriceSeries,
    return_type: ReturnType,
    sink: &mut DiagnosticSink,
) -> BenchmarkComparison {
    let bench_by_date: HashMap<NaiveDate, f64> = benchmark
        .dates()
        .iter()
        .copied()
        .zip(benchmark.closes().iter().copied())
        .collect();

    let (asset_prices, bench_prices): (Vec<f64>, Vec<f64>) = window
        .dates()
        .iter()
        .zip(window.closes())
        .filter_map(|(d, &c)| bench_by_date.get(d).map(|&b| (c, b)))
        .unzip();

    let mut comparison = BenchmarkComparison {
        ticker: Some(benchmark.ticker().to_string()),
        overlapping_returns: asset_prices.len().saturating_sub(1),
        ..BenchmarkComparison::absent()
    };

    if asset_prices.len() < MIN_RISK_POINTS {
        let overlap = Metric::undefined(UndefinedReason::InsufficientOverlap);
        comparison.beta = overlap;
        comparison.alpha = overlap;
        comparison.correlation = overlap;
        return comparison;
    }
    if asset_prices.len() < window.len() {
        sink.push(
            DiagnosticKind::PartialBenchmarkOverlap,
            format!(
                "benchmark {} covers {} of {} dates",
                benchmark.ticker(),
                asset_prices.len(),
                window.len()
            ),
        );
    }

    let asset = metrics::returns(&asset_prices, return_type);
    let bench = metrics::returns(&bench_prices, return_type);
    let periods = asset.len();

    match metrics::beta(&asset, &bench) {
        Some(beta) => {
            let asset_annual =
                metrics::annualized_return(asset_prices[0], asset_prices[asset_prices.len() - 1], periods);
            let bench_annual =
                metrics::annualized_return(bench_prices[0], bench_prices[bench_prices.len() - 1], periods);
            comparison.beta = Metric::from_value(beta, UndefinedReason::ZeroBenchmarkVariance);
            comparison.alpha = Metric::from_value(asset_annual - beta * bench_annual, UndefinedReason::Overflow);
            comparison.correlation = stats::correlation(&asset, &bench)
                .map_or(Metric::undefined(UndefinedReason::ZeroVolatility), |c| {
                    Metric::from_value(c, UndefinedReason::ZeroVolatility)
                });
        }
        None => {
            let flat = Metric::undefined(UndefinedReason::ZeroBenchmarkVariance);
            comparison.beta = flat;
            comparison.alpha = flat;
            comparison.correlation = flat;
        }
    }

    comparison
}
