//! MomentumIndicatorEngine: RSI, MACD, Stochastic, Williams %R and ROC.
//!
//! Each entry point checks the minimum history for its indicator and fails
//! with [`ValidationError::InsufficientData`] rather than truncating. The
//! current value is the last bar of the series.

pub mod output;

pub use output::{
    MacdOutput, MacdPoint, MomentumReport, RocOutput, RsiOutput, StochasticOutput, WilliamsROutput,
};

use crate::config::MomentumConfig;
use crate::diagnostics::{DiagnosticKind, DiagnosticSink, Metric, UndefinedReason};
use crate::domain::{dated_points, DirectionSignal, MacdSignal, OscillatorSignal, PriceSeries};
use crate::error::{require_len, ValidationError};
use crate::indicators::macd::macd_lines;
use crate::indicators::rsi::wilder_rsi;
use crate::indicators::stochastic::{is_zero_range, percent_d, percent_k};
use crate::indicators::{Indicator, Roc, WilliamsR};

pub struct MomentumIndicatorEngine;

impl MomentumIndicatorEngine {
    pub fn rsi(series: &PriceSeries, config: &MomentumConfig) -> Result<RsiOutput, ValidationError> {
        require_len("RSI", config.rsi_required(), series.len())?;
        let period = config.rsi_period();
        tracing::debug!(ticker = series.ticker(), points = series.len(), period, "computing RSI");

        let rsi = wilder_rsi(series.closes(), period);
        let value = rsi.values[series.len() - 1];
        let (overbought, oversold) = config.rsi_thresholds();

        Ok(RsiOutput {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            period,
            value,
            signal: OscillatorSignal::classify(value, overbought, oversold),
            avg_gain: rsi.avg_gain,
            avg_loss: rsi.avg_loss,
            overbought,
            oversold,
            history: dated_points(series.dates(), &rsi.values),
            diagnostics: Vec::new(),
        })
    }

    pub fn macd(series: &PriceSeries, config: &MomentumConfig) -> Result<MacdOutput, ValidationError> {
        require_len("MACD", config.macd_required(), series.len())?;
        let (fast, slow, signal_period) = config.macd_periods();
        tracing::debug!(ticker = series.ticker(), points = series.len(), fast, slow, signal_period, "computing MACD");

        let lines = macd_lines(series.closes(), fast, slow, signal_period);
        let last = series.len() - 1;
        let (macd_line, signal_line) = (lines.macd[last], lines.signal[last]);

        let history = series
            .dates()
            .iter()
            .enumerate()
            .filter(|(i, _)| lines.histogram[*i].is_finite())
            .map(|(i, &date)| MacdPoint {
                date,
                macd_line: lines.macd[i],
                signal_line: lines.signal[i],
                histogram: lines.histogram[i],
            })
            .collect();

        Ok(MacdOutput {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            fast_period: fast,
            slow_period: slow,
            signal_period,
            macd_line,
            signal_line,
            histogram: lines.histogram[last],
            signal: MacdSignal::classify(macd_line, signal_line),
            history,
            diagnostics: Vec::new(),
        })
    }

    pub fn stochastic(
        series: &PriceSeries,
        config: &MomentumConfig,
    ) -> Result<StochasticOutput, ValidationError> {
        require_len("Stochastic", config.stochastic_required(), series.len())?;
        let (k_period, d_period) = config.stochastic_periods();
        tracing::debug!(ticker = series.ticker(), points = series.len(), k_period, d_period, "computing Stochastic");

        let mut sink = DiagnosticSink::new(series.ticker());
        note_missing_range(series, "Stochastic", &mut sink);

        let k = percent_k(series, k_period);
        let d = percent_d(&k, d_period);
        let last = series.len() - 1;
        let (overbought, oversold) = config.stochastic_thresholds();

        let (percent_k, percent_d, signal) = if is_zero_range(series, last, k_period) {
            let undefined = Metric::undefined(UndefinedReason::ZeroPriceRange);
            sink.check("%K", &undefined);
            (undefined, undefined, OscillatorSignal::Neutral)
        } else {
            (
                Metric::Defined { value: k[last] },
                Metric::Defined { value: d[last] },
                OscillatorSignal::classify(k[last], overbought, oversold),
            )
        };

        Ok(StochasticOutput {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            k_period,
            d_period,
            percent_k,
            percent_d,
            signal,
            overbought,
            oversold,
            history_k: dated_points(series.dates(), &k),
            history_d: dated_points(series.dates(), &d),
            diagnostics: sink.into_vec(),
        })
    }

    pub fn williams_r(
        series: &PriceSeries,
        config: &MomentumConfig,
    ) -> Result<WilliamsROutput, ValidationError> {
        require_len("Williams %R", config.williams_required(), series.len())?;
        let period = config.williams_period();
        tracing::debug!(ticker = series.ticker(), points = series.len(), period, "computing Williams %R");

        let mut sink = DiagnosticSink::new(series.ticker());
        note_missing_range(series, "Williams %R", &mut sink);

        let values = WilliamsR::new(period).compute(series);
        let last = series.len() - 1;
        let (overbought, oversold) = config.williams_thresholds();

        let (value, signal) = if is_zero_range(series, last, period) {
            let undefined = Metric::undefined(UndefinedReason::ZeroPriceRange);
            sink.check("%R", &undefined);
            (undefined, OscillatorSignal::Neutral)
        } else {
            (
                Metric::Defined { value: values[last] },
                OscillatorSignal::classify(values[last], overbought, oversold),
            )
        };

        Ok(WilliamsROutput {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            period,
            value,
            signal,
            overbought,
            oversold,
            history: dated_points(series.dates(), &values),
            diagnostics: sink.into_vec(),
        })
    }

    pub fn roc(series: &PriceSeries, config: &MomentumConfig) -> Result<RocOutput, ValidationError> {
        require_len("ROC", config.roc_required(), series.len())?;
        let period = config.roc_period();
        tracing::debug!(ticker = series.ticker(), points = series.len(), period, "computing ROC");

        let values = Roc::new(period).compute(series);
        let value = values[series.len() - 1];

        Ok(RocOutput {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            period,
            value,
            signal: DirectionSignal::from_sign(value),
            history: dated_points(series.dates(), &values),
            diagnostics: Vec::new(),
        })
    }

    /// All five indicators. Requires the longest of the five histories up
    /// front so no partial report is produced.
    pub fn compute_all(
        series: &PriceSeries,
        config: &MomentumConfig,
    ) -> Result<MomentumReport, ValidationError> {
        require_len("momentum indicators", config.all_required(), series.len())?;
        Ok(MomentumReport {
            ticker: series.ticker().to_string(),
            date: series.last_date(),
            rsi: Self::rsi(series, config)?,
            macd: Self::macd(series, config)?,
            stochastic: Self::stochastic(series, config)?,
            williams_r: Self::williams_r(series, config)?,
            roc: Self::roc(series, config)?,
        })
    }
}

fn note_missing_range(series: &PriceSeries, indicator: &str, sink: &mut DiagnosticSink) {
    if !series.has_range() {
        sink.push(
            DiagnosticKind::MissingHighLow,
            format!("{indicator} computed from closes: no high/low data"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_range_series, make_series};

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.35).sin() * 6.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn rsi_requires_period_plus_one() {
        let cfg = MomentumConfig::default();
        let err = MomentumIndicatorEngine::rsi(&make_series(&wave(14)), &cfg).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientData { indicator: "RSI", required: 15, actual: 14 }
        );
        assert!(MomentumIndicatorEngine::rsi(&make_series(&wave(15)), &cfg).is_ok());
    }

    #[test]
    fn rsi_history_starts_after_warmup() {
        let series = make_series(&wave(40));
        let out = MomentumIndicatorEngine::rsi(&series, &MomentumConfig::default()).unwrap();
        assert_eq!(out.history.len(), 26);
        assert_eq!(out.history[0].date, series.dates()[14]);
        assert_eq!(out.history.last().map(|p| p.value), Some(out.value));
    }

    #[test]
    fn macd_signal_matches_lines() {
        let series = make_series(&wave(80));
        let out = MomentumIndicatorEngine::macd(&series, &MomentumConfig::default()).unwrap();
        assert_eq!(out.signal == MacdSignal::Bullish, out.macd_line > out.signal_line);
        assert!((out.histogram - (out.macd_line - out.signal_line)).abs() < 1e-12);
        // First point with all three lines: index slow + signal - 2 = 33
        assert_eq!(out.history.len(), 80 - 33);
    }

    #[test]
    fn macd_requires_slow_plus_signal() {
        let err = MomentumIndicatorEngine::macd(&make_series(&wave(34)), &MomentumConfig::default())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientData { required: 35, .. }));
    }

    #[test]
    fn stochastic_close_only_notes_missing_range() {
        let out =
            MomentumIndicatorEngine::stochastic(&make_series(&wave(40)), &MomentumConfig::default()).unwrap();
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::MissingHighLow);
        assert!(out.percent_k.is_defined());
    }

    #[test]
    fn stochastic_zero_range_is_undefined_and_neutral() {
        let out =
            MomentumIndicatorEngine::stochastic(&make_series(&[100.0; 30]), &MomentumConfig::default()).unwrap();
        assert_eq!(out.percent_k.reason(), Some(UndefinedReason::ZeroPriceRange));
        assert_eq!(out.signal, OscillatorSignal::Neutral);
        assert!(out.history_k.iter().all(|p| p.value == 50.0));
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UndefinedMetric));
    }

    #[test]
    fn williams_zero_range_is_undefined() {
        let out =
            MomentumIndicatorEngine::williams_r(&make_series(&[10.0; 20]), &MomentumConfig::default()).unwrap();
        assert_eq!(out.value.reason(), Some(UndefinedReason::ZeroPriceRange));
        assert_eq!(out.signal, OscillatorSignal::Neutral);
        assert!(out.history.iter().all(|p| p.value == -50.0));
    }

    #[test]
    fn williams_with_range_has_no_range_diagnostic() {
        let out = MomentumIndicatorEngine::williams_r(&make_range_series(&wave(30)), &MomentumConfig::default())
            .unwrap();
        assert!(out.diagnostics.is_empty());
        let v = out.value.value().unwrap();
        assert!((-100.0..=0.0).contains(&v));
    }

    #[test]
    fn roc_signal_follows_sign() {
        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = MomentumIndicatorEngine::roc(&make_series(&rising), &MomentumConfig::default()).unwrap();
        assert!(out.value > 0.0);
        assert_eq!(out.signal, DirectionSignal::Bullish);
    }

    #[test]
    fn compute_all_requires_longest_history() {
        let cfg = MomentumConfig::default();
        let err = MomentumIndicatorEngine::compute_all(&make_series(&wave(30)), &cfg).unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientData { required: 35, actual: 30, .. }));

        let report = MomentumIndicatorEngine::compute_all(&make_range_series(&wave(60)), &cfg).unwrap();
        assert_eq!(report.rsi.date, report.roc.date);
        assert_eq!(report.ticker, "TEST");
    }
}
