//! MovingAverageEngine: single moving averages and dual-MA crossovers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{CrossoverConfig, MaType, MovingAverageConfig};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Metric, UndefinedReason};
use crate::domain::{
    dated_points, CrossoverEvent, CrossoverSignal, IndicatorPoint, PricePosition, PriceSeries,
};
use crate::error::{require_len, ValidationError};
use crate::indicators::moving_average;

/// Bars over which the MA slope is measured.
pub const SLOPE_LOOKBACK: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageOutput {
    pub ticker: String,
    pub date: NaiveDate,
    pub ma_type: MaType,
    pub period: usize,
    /// Short key such as `ema_50`.
    pub label: String,
    pub value: f64,
    pub current_price: f64,
    pub price_vs_ma: PricePosition,
    /// `(price - ma) / ma * 100`.
    pub distance_pct: Metric,
    /// Percent change of the MA over the last [`SLOPE_LOOKBACK`] bars.
    pub slope_pct: Metric,
    pub history: Vec<IndicatorPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One leg of a crossover at the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaSnapshot {
    pub label: String,
    pub ma_type: MaType,
    pub period: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossoverPoint {
    pub date: NaiveDate,
    pub fast: f64,
    pub slow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverOutput {
    pub ticker: String,
    pub date: NaiveDate,
    pub fast: MaSnapshot,
    pub slow: MaSnapshot,
    pub current_signal: CrossoverSignal,
    /// `(fast - slow) / slow * 100`.
    pub spread_pct: Metric,
    /// First bar of the current fast/slow regime, if the regime ever changed.
    pub last_crossover_date: Option<NaiveDate>,
    /// Trading bars between the last crossover and the latest bar.
    pub days_since_crossover: Option<usize>,
    /// Direction the fast MA crossed in (`Bullish` = crossed above).
    pub last_crossover_direction: Option<CrossoverSignal>,
    /// Golden/death cross label; `None` unless the pair is exactly 50/200.
    pub crossover_event: CrossoverEvent,
    pub history: Vec<CrossoverPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Most recent sign change of `fast - slow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Crossing {
    index: usize,
    direction: CrossoverSignal,
}

pub struct MovingAverageEngine;

impl MovingAverageEngine {
    pub fn compute(
        series: &PriceSeries,
        config: &MovingAverageConfig,
    ) -> Result<MovingAverageOutput, ValidationError> {
        require_len("moving average", config.required(), series.len())?;
        let label = config.label();
        tracing::debug!(ticker = series.ticker(), points = series.len(), ma = %label, "computing moving average");

        let values = moving_average(config).compute(series);
        let last = series.len() - 1;
        let value = values[last];
        let price = series.last_close();
        let mut sink = DiagnosticSink::new(series.ticker());

        let distance_pct = Metric::ratio((price - value) * 100.0, value, UndefinedReason::ZeroAverage);
        let slope_pct = slope(&values, last);
        sink.check("distance_pct", &distance_pct);
        sink.check("slope_pct", &slope_pct);

        Ok(MovingAverageOutput {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            ma_type: config.ma_type(),
            period: config.period(),
            label,
            value,
            current_price: price,
            price_vs_ma: PricePosition::classify(price, value, config.at_tolerance()),
            distance_pct,
            slope_pct,
            history: dated_points(series.dates(), &values),
            diagnostics: sink.into_vec(),
        })
    }

    pub fn crossover(
        series: &PriceSeries,
        config: &CrossoverConfig,
    ) -> Result<CrossoverOutput, ValidationError> {
        require_len("moving average crossover", config.required(), series.len())?;
        let (fast_cfg, slow_cfg) = (config.fast(), config.slow());
        tracing::debug!(
            ticker = series.ticker(),
            points = series.len(),
            fast = %fast_cfg.label(),
            slow = %slow_cfg.label(),
            "computing moving average crossover"
        );

        let fast = moving_average(fast_cfg).compute(series);
        let slow = moving_average(slow_cfg).compute(series);
        let last = series.len() - 1;
        let dates = series.dates();
        let mut sink = DiagnosticSink::new(series.ticker());

        let spread_pct = Metric::ratio((fast[last] - slow[last]) * 100.0, slow[last], UndefinedReason::ZeroAverage);
        sink.check("spread_pct", &spread_pct);

        let crossing = last_crossing(&fast, &slow);
        let crossover_event = match crossing {
            Some(c) if config.is_golden_death_pair() => match c.direction {
                CrossoverSignal::Bullish => CrossoverEvent::GoldenCross,
                _ => CrossoverEvent::DeathCross,
            },
            _ => CrossoverEvent::None,
        };

        let history = (0..series.len())
            .filter(|&i| fast[i].is_finite() && slow[i].is_finite())
            .map(|i| CrossoverPoint {
                date: dates[i],
                fast: fast[i],
                slow: slow[i],
            })
            .collect();

        let snapshot = |cfg: &MovingAverageConfig, value: f64| MaSnapshot {
            label: cfg.label(),
            ma_type: cfg.ma_type(),
            period: cfg.period(),
            value,
        };

        Ok(CrossoverOutput {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            fast: snapshot(fast_cfg, fast[last]),
            slow: snapshot(slow_cfg, slow[last]),
            current_signal: CrossoverSignal::classify(fast[last], slow[last]),
            spread_pct,
            last_crossover_date: crossing.map(|c| dates[c.index]),
            days_since_crossover: crossing.map(|c| last - c.index),
            last_crossover_direction: crossing.map(|c| c.direction),
            crossover_event,
            history,
            diagnostics: sink.into_vec(),
        })
    }
}

fn slope(values: &[f64], last: usize) -> Metric {
    if last < SLOPE_LOOKBACK || !values[last - SLOPE_LOOKBACK].is_finite() {
        return Metric::undefined(UndefinedReason::InsufficientHistory);
    }
    let base = values[last - SLOPE_LOOKBACK];
    Metric::ratio((values[last] - base) * 100.0, base, UndefinedReason::ZeroAverage)
}

/// Scan backward for the most recent change in sign of `fast - slow`.
///
/// Bars where the two are equal belong to neither regime and are skipped.
/// The crossing is dated at the first bar of the current regime.
fn last_crossing(fast: &[f64], slow: &[f64]) -> Option<Crossing> {
    let mut regime: Option<(f64, usize)> = None;

    for i in (0..fast.len()).rev() {
        let diff = fast[i] - slow[i];
        if !diff.is_finite() {
            break;
        }
        if diff == 0.0 {
            continue;
        }
        let sign = diff.signum();
        match regime {
            None => regime = Some((sign, i)),
            Some((current, start)) if current != sign => {
                let direction = if current > 0.0 {
                    CrossoverSignal::Bullish
                } else {
                    CrossoverSignal::Bearish
                };
                return Some(Crossing {
                    index: start,
                    direction,
                });
            }
            Some((current, _)) => regime = Some((current, i)),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_series;

    #[test]
    fn constant_series_sits_at_average() {
        let series = make_series(&[100.0; 60]);
        for ma_type in [MaType::Sma, MaType::Ema] {
            let cfg = MovingAverageConfig::new(50, ma_type).unwrap();
            let out = MovingAverageEngine::compute(&series, &cfg).unwrap();
            assert!((out.value - 100.0).abs() < 1e-10);
            assert_eq!(out.price_vs_ma, PricePosition::At);
            assert_eq!(out.history.len(), 11);
            assert!(out.slope_pct.value().unwrap().abs() < 1e-10);
        }
    }

    #[test]
    fn requires_period_points() {
        let cfg = MovingAverageConfig::new(50, MaType::Sma).unwrap();
        let err = MovingAverageEngine::compute(&make_series(&[100.0; 49]), &cfg).unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientData { required: 50, actual: 49, .. }));
    }

    #[test]
    fn hma_requires_smoothing_window() {
        // 16 + 4 - 1 = 19
        let cfg = MovingAverageConfig::new(16, MaType::Hma).unwrap();
        assert!(MovingAverageEngine::compute(&make_series(&[100.0; 18]), &cfg).is_err());
        assert!(MovingAverageEngine::compute(&make_series(&[100.0; 19]), &cfg).is_ok());
    }

    #[test]
    fn slope_undefined_right_after_warmup() {
        let cfg = MovingAverageConfig::new(10, MaType::Wma).unwrap();
        let closes: Vec<f64> = (0..12).map(|i| 50.0 + i as f64).collect();
        let out = MovingAverageEngine::compute(&make_series(&closes), &cfg).unwrap();
        assert_eq!(out.slope_pct.reason(), Some(UndefinedReason::InsufficientHistory));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.price_vs_ma, PricePosition::Above);
        assert!(out.distance_pct.value().unwrap() > 0.0);
    }

    #[test]
    fn crossing_dated_at_start_of_regime() {
        let fast = [f64::NAN, 1.0, 1.0, 3.0, 3.0, 3.0];
        let slow = [f64::NAN, 2.0, 2.0, 2.0, 2.0, 2.0];
        let c = last_crossing(&fast, &slow).unwrap();
        assert_eq!(c.index, 3);
        assert_eq!(c.direction, CrossoverSignal::Bullish);
    }

    #[test]
    fn equal_bars_do_not_start_a_regime() {
        let fast = [3.0, 2.0, 1.0, 1.0];
        let slow = [2.0, 2.0, 2.0, 2.0];
        let c = last_crossing(&fast, &slow).unwrap();
        assert_eq!(c.index, 2);
        assert_eq!(c.direction, CrossoverSignal::Bearish);
        assert!(last_crossing(&[1.0, 1.0], &[2.0, 2.0]).is_none());
    }

    #[test]
    fn crossover_detects_trend_reversal() {
        // Down for 40 bars, then up for 40: fast SMA(5) crosses above SMA(20)
        let closes: Vec<f64> = (0..80)
            .map(|i| if i < 40 { 200.0 - i as f64 } else { 160.0 + (i - 40) as f64 * 2.0 })
            .collect();
        let series = make_series(&closes);
        let cfg = CrossoverConfig::with_periods(5, 20, MaType::Sma).unwrap();
        let out = MovingAverageEngine::crossover(&series, &cfg).unwrap();

        assert_eq!(out.current_signal, CrossoverSignal::Bullish);
        assert_eq!(out.last_crossover_direction, Some(CrossoverSignal::Bullish));
        assert_eq!(out.crossover_event, CrossoverEvent::None);
        let days = out.days_since_crossover.unwrap();
        assert!(days > 0 && days < 40);
        assert_eq!(out.last_crossover_date, Some(series.dates()[79 - days]));
        assert!(out.spread_pct.value().unwrap() > 0.0);
        assert_eq!(out.history.len(), 61);
    }

    #[test]
    fn golden_cross_labelled_for_50_200() {
        let closes: Vec<f64> = (0..320)
            .map(|i| if i < 220 { 300.0 - i as f64 * 0.5 } else { 190.0 + (i - 220) as f64 * 2.0 })
            .collect();
        let out = MovingAverageEngine::crossover(&make_series(&closes), &CrossoverConfig::default()).unwrap();
        assert_eq!(out.current_signal, CrossoverSignal::Bullish);
        assert_eq!(out.crossover_event, CrossoverEvent::GoldenCross);
    }

    #[test]
    fn no_crossover_without_regime_change() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let cfg = CrossoverConfig::with_periods(5, 20, MaType::Ema).unwrap();
        let out = MovingAverageEngine::crossover(&make_series(&closes), &cfg).unwrap();
        assert_eq!(out.current_signal, CrossoverSignal::Bullish);
        assert_eq!(out.last_crossover_date, None);
        assert_eq!(out.days_since_crossover, None);
        assert_eq!(out.crossover_event, CrossoverEvent::None);
    }
}
