//! Risk metric functions: return series (or prices) in, scalar out.
//!
//! Raw values here may be negative, positive or zero; the engine applies the
//! clamping and undefined-value policy on top.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::config::{ReturnType, VarMethod};
use crate::diagnostics::ZERO_EPSILON;
use crate::stats::{self, TRADING_DAYS_PER_YEAR};

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

pub fn returns(prices: &[f64], return_type: ReturnType) -> Vec<f64> {
    match return_type {
        ReturnType::Simple => stats::simple_returns(prices),
        ReturnType::Log => stats::log_returns(prices),
    }
}

/// Unclamped VaR threshold: the `(1 - confidence)` quantile of the return
/// distribution, empirical or normal.
pub fn value_at_risk(returns: &[f64], confidence: f64, method: VarMethod) -> Option<f64> {
    match method {
        VarMethod::Historical => stats::percentile(returns, 1.0 - confidence),
        VarMethod::Parametric => {
            let mean = stats::mean(returns)?;
            let std = stats::sample_std_dev(returns)?;
            let z = standard_normal()?.inverse_cdf(confidence);
            Some(mean - z * std)
        }
    }
}

/// Unclamped expected shortfall beyond the VaR threshold.
///
/// Historical: mean of all returns at or below `var`.
/// Parametric: `mean - std * pdf(z) / (1 - confidence)`.
pub fn conditional_var(returns: &[f64], var: f64, confidence: f64, method: VarMethod) -> Option<f64> {
    match method {
        VarMethod::Historical => {
            let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
            // Rounding can lift the mean of a tail of equal values above `var`.
            Some(stats::mean(&tail).map_or(var, |m| m.min(var)))
        }
        VarMethod::Parametric => {
            let mean = stats::mean(returns)?;
            let std = stats::sample_std_dev(returns)?;
            let normal = standard_normal()?;
            let z = normal.inverse_cdf(confidence);
            Some(mean - std * normal.pdf(z) / (1.0 - confidence))
        }
    }
}

/// Sample standard deviation of the excess returns that fall below
/// `daily_rf`. `None` with fewer than two such days.
pub fn downside_deviation(returns: &[f64], daily_rf: f64) -> Option<f64> {
    let downside: Vec<f64> = returns.iter().map(|r| r - daily_rf).filter(|e| *e < 0.0).collect();
    stats::sample_std_dev(&downside)
}

/// Deepest peak-to-trough decline of a price path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawdown {
    /// `min(price / running_max - 1)`, always `<= 0`.
    pub max_drawdown: f64,
    pub peak_index: usize,
    pub trough_index: usize,
}

pub fn max_drawdown(prices: &[f64]) -> Drawdown {
    let mut result = Drawdown {
        max_drawdown: 0.0,
        peak_index: 0,
        trough_index: 0,
    };
    let Some(&first) = prices.first() else {
        return result;
    };

    let mut peak = first;
    let mut peak_index = 0;
    for (i, &p) in prices.iter().enumerate() {
        if p > peak {
            peak = p;
            peak_index = i;
        }
        let dd = p / peak - 1.0;
        if dd < result.max_drawdown {
            result = Drawdown {
                max_drawdown: dd,
                peak_index,
                trough_index: i,
            };
        }
    }
    result
}

/// Geometric annualization of the move from `first` to `last` over `periods`
/// daily returns.
pub fn annualized_return(first: f64, last: f64, periods: usize) -> f64 {
    if periods == 0 || first <= 0.0 {
        return 0.0;
    }
    (last / first).powf(TRADING_DAYS_PER_YEAR / periods as f64) - 1.0
}

pub fn annual_volatility(daily_std: f64) -> f64 {
    daily_std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Beta of `asset` against `benchmark`; `None` when the benchmark is flat.
pub fn beta(asset: &[f64], benchmark: &[f64]) -> Option<f64> {
    let cov = stats::covariance(asset, benchmark)?;
    let var = stats::sample_variance(benchmark)?;
    if var < ZERO_EPSILON * ZERO_EPSILON {
        return None;
    }
    Some(cov / var)
}
