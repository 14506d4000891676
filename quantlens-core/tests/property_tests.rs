//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Drawdown, VaR and CVaR are never positive; historical CVaR <= VaR
//! 2. Oscillators stay inside their documented ranges
//! 3. MACD signal is bullish exactly when the line is above its signal
//! 4. Invalid crossover and MACD configs are always rejected
//! 5. Rising prices give positive ROC everywhere past warm-up

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use quantlens_core::config::{
    CrossoverConfig, MaType, MomentumConfig, MovingAverageConfig, RiskConfig, VarMethod,
};
use quantlens_core::domain::{DirectionSignal, MacdSignal};
use quantlens_core::indicators::{Indicator, Roc};
use quantlens_core::{ConfigError, MomentumIndicatorEngine, PriceSeries, RiskMetricsEngine};

// ── Strategies (proptest) ────────────────────────────────────────────

fn dates(n: usize) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    (0..n).map(|i| base + Duration::days(i as i64)).collect()
}

/// Random-walk closes from a start price and bounded daily moves.
fn arb_closes(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (
        10.0..500.0_f64,
        prop::collection::vec(-0.08..0.08_f64, min_len - 1..max_len),
    )
        .prop_map(|(start, moves)| {
            let mut closes = Vec::with_capacity(moves.len() + 1);
            closes.push(start);
            for m in moves {
                let prev = *closes.last().unwrap();
                closes.push(prev * (1.0 + m));
            }
            closes
        })
}

fn arb_series(min_len: usize, max_len: usize) -> impl Strategy<Value = PriceSeries> {
    arb_closes(min_len, max_len).prop_map(|closes| {
        PriceSeries::new("PROP", dates(closes.len()), closes).unwrap()
    })
}

/// Series with high/low bands of random width around each close.
fn arb_range_series(min_len: usize, max_len: usize) -> impl Strategy<Value = PriceSeries> {
    arb_closes(min_len, max_len)
        .prop_flat_map(|closes| {
            let n = closes.len();
            (
                Just(closes),
                prop::collection::vec((0.0..0.05_f64, 0.0..0.05_f64), n),
            )
        })
        .prop_map(|(closes, widths)| {
            let high = closes.iter().zip(&widths).map(|(c, (up, _))| c * (1.0 + up)).collect();
            let low = closes.iter().zip(&widths).map(|(c, (_, down))| c * (1.0 - down)).collect();
            PriceSeries::with_range("PROP", dates(closes.len()), closes, high, low, None).unwrap()
        })
}

fn arb_confidence() -> impl Strategy<Value = f64> {
    (0.50..=0.99_f64).prop_map(|c| (c * 100.0).round() / 100.0)
}

// ── 1. Risk signs ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_var_cvar_never_positive(
        series in arb_series(30, 300),
        confidence in arb_confidence(),
        parametric in prop::bool::ANY,
    ) {
        let method = if parametric { VarMethod::Parametric } else { VarMethod::Historical };
        let config = RiskConfig::builder()
            .confidence_level(confidence)
            .var_method(method)
            .build()
            .unwrap();
        let report = RiskMetricsEngine::compute(&series, None, &config).unwrap();

        prop_assert!(report.max_drawdown <= 0.0);
        prop_assert!(report.value_at_risk <= 0.0);
        prop_assert!(report.conditional_var <= 0.0);
    }

    /// With at least one return at or below the threshold, CVaR is at least
    /// as extreme as VaR.
    #[test]
    fn historical_cvar_at_least_as_extreme_as_var(series in arb_series(30, 300)) {
        let report = RiskMetricsEngine::compute(&series, None, &RiskConfig::default()).unwrap();
        prop_assert!(report.conditional_var <= report.value_at_risk);
        prop_assert!(report.diagnostics.iter().all(|d| {
            d.kind != quantlens_core::DiagnosticKind::CvarLessExtremeThanVar
        }), "unexpected CvarLessExtremeThanVar diagnostic");
    }
}

// ── 2. Oscillator ranges ─────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_within_0_100(series in arb_series(15, 200)) {
        let out = MomentumIndicatorEngine::rsi(&series, &MomentumConfig::default()).unwrap();
        prop_assert!((0.0..=100.0).contains(&out.value));
        for p in &out.history {
            prop_assert!((0.0..=100.0).contains(&p.value), "RSI {} at {}", p.value, p.date);
        }
    }

    #[test]
    fn stochastic_within_0_100(series in arb_range_series(17, 200)) {
        let out = MomentumIndicatorEngine::stochastic(&series, &MomentumConfig::default()).unwrap();
        for p in out.history_k.iter().chain(out.history_d.iter()) {
            prop_assert!((-1e-9..=100.0 + 1e-9).contains(&p.value), "%K/%D {}", p.value);
        }
    }

    #[test]
    fn williams_within_minus_100_0(series in arb_range_series(15, 200)) {
        let out = MomentumIndicatorEngine::williams_r(&series, &MomentumConfig::default()).unwrap();
        for p in &out.history {
            prop_assert!((-100.0 - 1e-9..=1e-9).contains(&p.value), "%R {}", p.value);
        }
    }
}

// ── 3. MACD signal ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn macd_bullish_iff_line_above_signal(series in arb_series(35, 250)) {
        let out = MomentumIndicatorEngine::macd(&series, &MomentumConfig::default()).unwrap();
        prop_assert_eq!(out.signal == MacdSignal::Bullish, out.macd_line > out.signal_line);
    }
}

// ── 4. Config invariants ─────────────────────────────────────────────

proptest! {
    #[test]
    fn identical_crossover_periods_rejected(
        period in 2usize..=500,
        fast_ema in prop::bool::ANY,
    ) {
        let fast_type = if fast_ema { MaType::Ema } else { MaType::Sma };
        let fast = MovingAverageConfig::new(period, fast_type).unwrap();
        let slow = MovingAverageConfig::new(period, MaType::Sma).unwrap();
        prop_assert_eq!(
            CrossoverConfig::new(fast, slow),
            Err(ConfigError::IdenticalPeriods { period })
        );
    }

    #[test]
    fn macd_fast_not_below_slow_rejected(fast in 3usize..=100, offset in 0usize..=50) {
        let slow = fast.saturating_sub(offset).max(3);
        prop_assume!(fast >= slow);
        let result = MomentumConfig::builder().macd(fast, slow, 9).build();
        prop_assert!(matches!(result, Err(ConfigError::FastNotBelowSlow { .. })), "expected FastNotBelowSlow error");
    }
}

// ── 5. Monotone series ───────────────────────────────────────────────

proptest! {
    #[test]
    fn rising_series_has_positive_roc(
        start in 1.0..100.0_f64,
        steps in prop::collection::vec(0.001..0.05_f64, 13..120),
    ) {
        let mut closes = vec![start];
        for s in steps {
            let prev = *closes.last().unwrap();
            closes.push(prev * (1.0 + s));
        }
        let series = PriceSeries::new("UP", dates(closes.len()), closes).unwrap();
        let config = MomentumConfig::default();

        let values = Roc::new(config.roc_period()).compute(&series);
        for v in values.iter().skip(config.roc_period()) {
            prop_assert!(*v > 0.0);
        }
        let out = MomentumIndicatorEngine::roc(&series, &config).unwrap();
        prop_assert_eq!(out.signal, DirectionSignal::Bullish);
        prop_assert!(out.history.iter().all(|p| p.value > 0.0));
    }
}
