//! PriceSeries: the validated, immutable price history every engine consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Raw price-history record as supplied by a market-data collaborator.
///
/// This is the unchecked wire shape. Convert it with [`PriceSeries::from_record`]
/// (or deserialize a `PriceSeries` directly, which runs the same checks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeriesRecord {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Vec<f64>>,
}

/// Validated daily price history for a single ticker.
///
/// Invariants, all checked once at construction:
/// - at least one point, non-empty ticker
/// - every supplied array has one value per date
/// - prices finite and strictly positive, volume finite and non-negative
/// - dates strictly increasing
/// - `high[i] >= low[i]` when both are present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriceSeriesRecord", into = "PriceSeriesRecord")]
pub struct PriceSeries {
    ticker: String,
    dates: Vec<NaiveDate>,
    close: Vec<f64>,
    high: Option<Vec<f64>>,
    low: Option<Vec<f64>>,
    volume: Option<Vec<f64>>,
}

impl PriceSeries {
    /// Close-only series.
    pub fn new(
        ticker: impl Into<String>,
        dates: Vec<NaiveDate>,
        close: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        Self::from_record(PriceSeriesRecord {
            ticker: ticker.into(),
            dates,
            close,
            high: None,
            low: None,
            volume: None,
        })
    }

    /// Series with close plus high/low (and optional volume).
    pub fn with_range(
        ticker: impl Into<String>,
        dates: Vec<NaiveDate>,
        close: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        volume: Option<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        Self::from_record(PriceSeriesRecord {
            ticker: ticker.into(),
            dates,
            close,
            high: Some(high),
            low: Some(low),
            volume,
        })
    }

    /// Validate a raw record and take ownership of its arrays.
    pub fn from_record(record: PriceSeriesRecord) -> Result<Self, ValidationError> {
        if record.ticker.trim().is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        let n = record.dates.len();
        if n == 0 {
            return Err(ValidationError::Empty);
        }

        check_len("close", n, record.close.len())?;
        if let Some(high) = &record.high {
            check_len("high", n, high.len())?;
        }
        if let Some(low) = &record.low {
            check_len("low", n, low.len())?;
        }
        if let Some(volume) = &record.volume {
            check_len("volume", n, volume.len())?;
        }

        check_chronological(&record.dates)?;

        check_prices("close", &record.close)?;
        if let Some(high) = &record.high {
            check_prices("high", high)?;
        }
        if let Some(low) = &record.low {
            check_prices("low", low)?;
        }
        if let Some(volume) = &record.volume {
            for (index, &v) in volume.iter().enumerate() {
                if !v.is_finite() {
                    return Err(ValidationError::NonFiniteValue {
                        field: "volume",
                        index,
                    });
                }
                if v < 0.0 {
                    return Err(ValidationError::NegativeVolume { index, value: v });
                }
            }
        }

        if let (Some(high), Some(low)) = (&record.high, &record.low) {
            for (index, (&h, &l)) in high.iter().zip(low.iter()).enumerate() {
                if h < l {
                    return Err(ValidationError::HighBelowLow {
                        index,
                        high: h,
                        low: l,
                    });
                }
            }
        }

        Ok(Self {
            ticker: record.ticker,
            dates: record.dates,
            close: record.close,
            high: record.high,
            low: record.low,
            volume: record.volume,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.close
    }

    pub fn highs(&self) -> Option<&[f64]> {
        self.high.as_deref()
    }

    pub fn lows(&self) -> Option<&[f64]> {
        self.low.as_deref()
    }

    pub fn volumes(&self) -> Option<&[f64]> {
        self.volume.as_deref()
    }

    /// True when both high and low arrays were supplied.
    pub fn has_range(&self) -> bool {
        self.high.is_some() && self.low.is_some()
    }

    /// Highs, or closes when the series is close-only.
    pub fn highs_or_close(&self) -> &[f64] {
        match (&self.high, &self.low) {
            (Some(high), Some(_)) => high,
            _ => &self.close,
        }
    }

    /// Lows, or closes when the series is close-only.
    pub fn lows_or_close(&self) -> &[f64] {
        match (&self.high, &self.low) {
            (Some(_), Some(low)) => low,
            _ => &self.close,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a constructed series; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn last_close(&self) -> f64 {
        self.close[self.close.len() - 1]
    }

    /// The trailing `n` points (or the whole series if shorter).
    ///
    /// A suffix of a valid series is itself valid, so no re-check is needed.
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.len().saturating_sub(n.max(1));
        PriceSeries {
            ticker: self.ticker.clone(),
            dates: self.dates[start..].to_vec(),
            close: self.close[start..].to_vec(),
            high: self.high.as_ref().map(|v| v[start..].to_vec()),
            low: self.low.as_ref().map(|v| v[start..].to_vec()),
            volume: self.volume.as_ref().map(|v| v[start..].to_vec()),
        }
    }
}

impl TryFrom<PriceSeriesRecord> for PriceSeries {
    type Error = ValidationError;

    fn try_from(record: PriceSeriesRecord) -> Result<Self, Self::Error> {
        PriceSeries::from_record(record)
    }
}

impl From<PriceSeries> for PriceSeriesRecord {
    fn from(series: PriceSeries) -> Self {
        PriceSeriesRecord {
            ticker: series.ticker,
            dates: series.dates,
            close: series.close,
            high: series.high,
            low: series.low,
            volume: series.volume,
        }
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), ValidationError> {
    if expected != actual {
        return Err(ValidationError::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_prices(field: &'static str, values: &[f64]) -> Result<(), ValidationError> {
    for (index, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(ValidationError::NonFiniteValue { field, index });
        }
        if v <= 0.0 {
            return Err(ValidationError::NonPositivePrice {
                field,
                index,
                value: v,
            });
        }
    }
    Ok(())
}

fn check_chronological(dates: &[NaiveDate]) -> Result<(), ValidationError> {
    for (i, w) in dates.windows(2).enumerate() {
        let index = i + 1;
        if w[1] == w[0] {
            return Err(ValidationError::DuplicateDate {
                index,
                date: w[1],
            });
        }
        if w[1] < w[0] {
            return Err(ValidationError::NotChronological {
                index,
                previous: w[0],
                current: w[1],
            });
        }
    }
    Ok(())
}
