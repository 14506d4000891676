//! PriceSeriesValidator: data-quality gatekeeper.
//!
//! Structural problems (misaligned arrays, bad ordering, non-positive prices)
//! are construction errors of [`PriceSeries`] and never reach this module.
//! What remains are data-quality findings, which are annotated and scored but
//! never fail the call.

pub mod outliers;
pub mod report;

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

pub use report::{Anomaly, AnomalyCounts, ValidationReport};

use crate::config::{OutlierMethod, ValidationConfig};
use crate::domain::{PriceSeries, PriceSeriesRecord};
use crate::stats;

const COMPLETENESS_WEIGHT: f64 = 0.6;
const CONSISTENCY_WEIGHT: f64 = 0.4;

pub struct PriceSeriesValidator;

impl PriceSeriesValidator {
    /// Run every enabled check over a constructed series.
    pub fn validate(series: &PriceSeries, config: &ValidationConfig) -> ValidationReport {
        tracing::debug!(ticker = series.ticker(), points = series.len(), "validating price series");

        let dates = series.dates();
        let closes = series.closes();
        let returns = stats::simple_returns(closes);

        let mut anomalies = Vec::new();
        let mut counts = AnomalyCounts::default();

        let expected_points = expected_trading_days(series.first_date(), series.last_date());
        let mut missing_ratio = 0.0;
        if config.check_missing_data() {
            let missing = expected_points.saturating_sub(series.len());
            if expected_points > 0 {
                missing_ratio = missing as f64 / expected_points as f64;
            }
            counts.missing_days = missing;
            if missing_ratio > config.missing_data_threshold() {
                anomalies.push(Anomaly::MissingData {
                    expected_days: expected_points,
                    observed_days: series.len(),
                    missing_ratio,
                });
            }
        }

        if config.check_outliers() {
            let hits = outliers::detect(&returns, config.outlier_method(), config.outlier_threshold());
            let hits = outliers::collapse_reversals(&returns, hits);
            counts.outliers = hits.len();
            anomalies.extend(hits.into_iter().map(|hit| Anomaly::Outlier {
                date: dates[hit.bar],
                close: closes[hit.bar],
                daily_return: returns[hit.index],
                score: hit.score,
            }));
        }

        if config.check_gaps() {
            for w in dates.windows(2) {
                let days = (w[1] - w[0]).num_days();
                if days > config.max_gap_days() {
                    counts.gaps += 1;
                    anomalies.push(Anomaly::DateGap {
                        from: w[0],
                        to: w[1],
                        days,
                    });
                }
            }
        }

        if config.check_splits() {
            for i in 1..closes.len() {
                let ratio = closes[i] / closes[i - 1];
                if (ratio - 1.0).abs() > config.split_threshold() {
                    counts.potential_splits += 1;
                    anomalies.push(Anomaly::PotentialSplit {
                        date: dates[i],
                        previous_close: closes[i - 1],
                        close: closes[i],
                        ratio,
                    });
                }
            }
        }

        if config.check_duplicates() {
            let duplicates = duplicate_dates(dates);
            counts.duplicates = duplicates.len();
            anomalies.extend(duplicates);
        }

        let report = score(
            series.ticker(),
            series.len(),
            expected_points,
            missing_ratio,
            returns.len(),
            counts,
            anomalies,
            config,
        );
        tracing::debug!(
            ticker = series.ticker(),
            reliability = report.reliability_score,
            is_valid = report.is_valid,
            "validation finished"
        );
        report
    }

    /// Validate a raw, unconstructed record.
    ///
    /// Repeated dates are reported as [`Anomaly::DuplicateDate`] and the
    /// remaining checks run on the record with later repeats dropped. Any
    /// other structural fault yields a single [`Anomaly::Malformed`] and an
    /// invalid report with zero scores.
    pub fn validate_record(record: &PriceSeriesRecord, config: &ValidationConfig) -> ValidationReport {
        let duplicates = if config.check_duplicates() {
            duplicate_dates(&record.dates)
        } else {
            Vec::new()
        };
        let deduped = drop_repeated_dates(record);

        match PriceSeries::from_record(deduped) {
            Ok(series) => {
                let mut report = Self::validate(&series, config);
                if duplicates.is_empty() {
                    return report;
                }
                report.counts.duplicates = duplicates.len();
                report.total_points = record.dates.len();
                report.anomalies.extend(duplicates);
                score(
                    &report.ticker,
                    report.total_points,
                    report.expected_points,
                    report.missing_ratio,
                    series.len().saturating_sub(1),
                    report.counts,
                    report.anomalies,
                    config,
                )
            }
            Err(err) => {
                tracing::warn!(ticker = %record.ticker, error = %err, "malformed price record");
                let mut anomalies = duplicates;
                let counts = AnomalyCounts {
                    duplicates: anomalies.len(),
                    ..AnomalyCounts::default()
                };
                anomalies.push(Anomaly::Malformed {
                    message: err.to_string(),
                });
                ValidationReport {
                    ticker: record.ticker.clone(),
                    is_valid: false,
                    reliability_score: 0.0,
                    completeness_score: 0.0,
                    consistency_score: 0.0,
                    total_points: record.dates.len(),
                    expected_points: 0,
                    missing_ratio: 0.0,
                    counts,
                    anomalies,
                    recommendations: vec![format!("Fix the input record before analysis: {err}")],
                }
            }
        }
    }
}

/// Weekdays between `first` and `last`, both inclusive.
pub fn expected_trading_days(first: NaiveDate, last: NaiveDate) -> usize {
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count()
}

fn duplicate_dates(dates: &[NaiveDate]) -> Vec<Anomaly> {
    let mut seen = HashSet::with_capacity(dates.len());
    dates
        .iter()
        .enumerate()
        .filter(|(_, d)| !seen.insert(**d))
        .map(|(index, &date)| Anomaly::DuplicateDate { index, date })
        .collect()
}

/// Keep the first occurrence of every date. Arrays of the wrong length are
/// left untouched so construction reports the mismatch.
fn drop_repeated_dates(record: &PriceSeriesRecord) -> PriceSeriesRecord {
    let n = record.dates.len();
    let mut seen = HashSet::with_capacity(n);
    let keep: Vec<bool> = record.dates.iter().map(|d| seen.insert(*d)).collect();

    let retain = |values: &[f64]| -> Vec<f64> {
        if values.len() != n {
            return values.to_vec();
        }
        values
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(v, _)| *v)
            .collect()
    };

    PriceSeriesRecord {
        ticker: record.ticker.clone(),
        dates: record
            .dates
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(d, _)| *d)
            .collect(),
        close: retain(&record.close),
        high: record.high.as_deref().map(retain),
        low: record.low.as_deref().map(retain),
        volume: record.volume.as_deref().map(retain),
    }
}

#[allow(clippy::too_many_arguments)]
fn score(
    ticker: &str,
    total_points: usize,
    expected_points: usize,
    missing_ratio: f64,
    return_count: usize,
    counts: AnomalyCounts,
    anomalies: Vec<Anomaly>,
    config: &ValidationConfig,
) -> ValidationReport {
    let completeness = (1.0 - missing_ratio).clamp(0.0, 1.0);
    let outlier_ratio = if return_count == 0 {
        0.0
    } else {
        counts.outliers as f64 / return_count as f64
    };
    let consistency = (1.0 - outlier_ratio).clamp(0.0, 1.0);
    let reliability = COMPLETENESS_WEIGHT * completeness + CONSISTENCY_WEIGHT * consistency;

    let is_valid = reliability >= config.min_reliability_score()
        && counts.outliers <= config.max_outliers()
        && counts.gaps <= config.max_gaps()
        && counts.duplicates <= config.max_duplicates()
        && missing_ratio <= config.missing_data_threshold();

    let recommendations = recommendations(missing_ratio, reliability, &counts, config);

    ValidationReport {
        ticker: ticker.to_string(),
        is_valid,
        reliability_score: reliability,
        completeness_score: completeness,
        consistency_score: consistency,
        total_points,
        expected_points,
        missing_ratio,
        counts,
        anomalies,
        recommendations,
    }
}

fn recommendations(
    missing_ratio: f64,
    reliability: f64,
    counts: &AnomalyCounts,
    config: &ValidationConfig,
) -> Vec<String> {
    let mut out = Vec::new();

    if missing_ratio > config.missing_data_threshold() {
        out.push(format!(
            "Missing data ratio {:.1}% exceeds the {:.1}% threshold; fill gaps or use a more complete source",
            missing_ratio * 100.0,
            config.missing_data_threshold() * 100.0
        ));
    }
    if counts.outliers > 0 {
        let method = match config.outlier_method() {
            OutlierMethod::ZScore => "z-score",
            OutlierMethod::Iqr => "IQR",
            OutlierMethod::ModifiedZScore => "modified z-score",
        };
        out.push(format!(
            "{} outlier return(s) detected by {method}; verify them against the source before relying on risk metrics",
            counts.outliers
        ));
    }
    if counts.gaps > 0 {
        out.push(format!(
            "{} date gap(s) longer than {} days; indicators spanning them may be distorted",
            counts.gaps,
            config.max_gap_days()
        ));
    }
    if counts.potential_splits > 0 {
        out.push(format!(
            "{} potential split or dividend jump(s); confirm prices are adjusted",
            counts.potential_splits
        ));
    }
    if counts.duplicates > 0 {
        out.push(format!(
            "{} duplicate date(s); deduplicate the series before analysis",
            counts.duplicates
        ));
    }
    if reliability < config.min_reliability_score() {
        out.push(format!(
            "Reliability score {reliability:.2} is below the {:.2} minimum; treat derived indicators with caution",
            config.min_reliability_score()
        ));
    }
    if out.is_empty() {
        out.push("Data quality is acceptable for analysis".to_string());
    }

    out
}
