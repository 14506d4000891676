//! Domain types: the validated price series and categorical signals.

pub mod series;
pub mod signal;

pub use series::{PriceSeries, PriceSeriesRecord};
pub use signal::{
    CrossoverEvent, CrossoverSignal, DirectionSignal, MacdSignal, OscillatorSignal, PricePosition,
};

/// A dated indicator value, used for output histories.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorPoint {
    pub date: chrono::NaiveDate,
    pub value: f64,
}

/// Pair each finite value with its date, skipping warm-up NaNs.
pub(crate) fn dated_points(dates: &[chrono::NaiveDate], values: &[f64]) -> Vec<IndicatorPoint> {
    dates
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| v.is_finite())
        .map(|(&date, &value)| IndicatorPoint { date, value })
        .collect()
}
