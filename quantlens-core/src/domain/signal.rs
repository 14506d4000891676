//! Categorical signals derived from indicator values.

use serde::{Deserialize, Serialize};

/// Bounded-oscillator reading (RSI, Stochastic, Williams %R).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl OscillatorSignal {
    /// Classify `value` against `overbought`/`oversold` thresholds (inclusive).
    pub fn classify(value: f64, overbought: f64, oversold: f64) -> Self {
        if value >= overbought {
            OscillatorSignal::Overbought
        } else if value <= oversold {
            OscillatorSignal::Oversold
        } else {
            OscillatorSignal::Neutral
        }
    }
}

/// MACD has no neutral state: the line is either above its signal or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdSignal {
    Bullish,
    Bearish,
}

impl MacdSignal {
    pub fn classify(macd_line: f64, signal_line: f64) -> Self {
        if macd_line > signal_line {
            MacdSignal::Bullish
        } else {
            MacdSignal::Bearish
        }
    }
}

/// Sign-based direction (ROC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionSignal {
    Bullish,
    Bearish,
    Neutral,
}

impl DirectionSignal {
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            DirectionSignal::Bullish
        } else if value < 0.0 {
            DirectionSignal::Bearish
        } else {
            DirectionSignal::Neutral
        }
    }
}

/// Where the latest close sits relative to a moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricePosition {
    Above,
    Below,
    At,
}

impl PricePosition {
    /// Compare with a relative tolerance band around `ma`.
    pub fn classify(price: f64, ma: f64, tolerance: f64) -> Self {
        let band = ma.abs() * tolerance;
        if (price - ma).abs() <= band {
            PricePosition::At
        } else if price > ma {
            PricePosition::Above
        } else {
            PricePosition::Below
        }
    }
}

/// Relationship between a fast and slow moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossoverSignal {
    Bullish,
    Bearish,
    Neutral,
}

impl CrossoverSignal {
    pub fn classify(fast: f64, slow: f64) -> Self {
        if fast > slow {
            CrossoverSignal::Bullish
        } else if fast < slow {
            CrossoverSignal::Bearish
        } else {
            CrossoverSignal::Neutral
        }
    }
}

/// Named 50/200 crossover events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossoverEvent {
    GoldenCross,
    DeathCross,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oscillator_thresholds_inclusive() {
        assert_eq!(OscillatorSignal::classify(70.0, 70.0, 30.0), OscillatorSignal::Overbought);
        assert_eq!(OscillatorSignal::classify(30.0, 70.0, 30.0), OscillatorSignal::Oversold);
        assert_eq!(OscillatorSignal::classify(50.0, 70.0, 30.0), OscillatorSignal::Neutral);
        assert_eq!(OscillatorSignal::classify(-10.0, -20.0, -80.0), OscillatorSignal::Overbought);
        assert_eq!(OscillatorSignal::classify(-90.0, -20.0, -80.0), OscillatorSignal::Oversold);
    }

    #[test]
    fn macd_equal_lines_are_bearish() {
        assert_eq!(MacdSignal::classify(0.5, 0.5), MacdSignal::Bearish);
        assert_eq!(MacdSignal::classify(0.6, 0.5), MacdSignal::Bullish);
    }

    #[test]
    fn price_position_tolerance_band() {
        assert_eq!(PricePosition::classify(100.05, 100.0, 0.001), PricePosition::At);
        assert_eq!(PricePosition::classify(100.2, 100.0, 0.001), PricePosition::Above);
        assert_eq!(PricePosition::classify(99.8, 100.0, 0.001), PricePosition::Below);
    }

    #[test]
    fn serialized_names() {
        assert_eq!(serde_json::to_string(&OscillatorSignal::Overbought).unwrap(), r#""overbought""#);
        assert_eq!(serde_json::to_string(&PricePosition::At).unwrap(), r#""AT""#);
        assert_eq!(serde_json::to_string(&CrossoverEvent::GoldenCross).unwrap(), r#""GOLDEN_CROSS""#);
        assert_eq!(serde_json::to_string(&CrossoverSignal::Bearish).unwrap(), r#""BEARISH""#);
    }
}
