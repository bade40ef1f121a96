//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values, aligned 1:1 with bars
//!
//! Every calculation is a pure function of the input series. Warm-up entries
//! are kept in the series with `valid == false` so indices always line up
//! with the price bars.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod streaming;
pub mod volatility;

pub use ema::{calculate_ema, ema_values};
pub use macd::{calculate_macd, macd_lines, MacdLines};
pub use rsi::{calculate_rsi, rsi_values};
pub use volatility::{calculate_volatility, volatility_values};

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Volatility(usize),
    Macd {
        short: usize,
        long: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index` if it is past warm-up and single-valued.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }

    /// All single-valued entries, `None` where warm-up is not complete.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        (0..self.values.len()).map(|i| self.simple_at(i)).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(span) => write!(f, "EMA({})", span),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Volatility(window) => write!(f, "VOLATILITY({})", window),
            IndicatorType::Macd {
                short,
                long,
                signal,
            } => write!(f, "MACD({},{},{})", short, long, signal),
        }
    }
}

/// Attach bar timestamps to an optional-valued series.
pub(crate) fn simple_series(
    bars: &[PriceBar],
    indicator_type: IndicatorType,
    values: &[Option<f64>],
) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(values)
        .map(|(bar, v)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: v.is_some(),
            value: IndicatorValue::Simple(v.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::make_bars;
    use super::*;

    #[test]
    fn indicator_type_display_ema() {
        assert_eq!(IndicatorType::Ema(20).to_string(), "EMA(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            short: 12,
            long: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_volatility() {
        assert_eq!(IndicatorType::Volatility(10).to_string(), "VOLATILITY(10)");
    }

    #[test]
    fn simple_at_hides_warmup() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = simple_series(&bars, IndicatorType::Rsi(2), &[None, Some(50.0), Some(75.0)]);

        assert_eq!(series.len(), 3);
        assert_eq!(series.simple_at(0), None);
        assert_eq!(series.simple_at(1), Some(50.0));
        assert_eq!(series.simple_at(5), None);
        assert_eq!(series.simple_values(), vec![None, Some(50.0), Some(75.0)]);
    }

    #[test]
    fn simple_at_ignores_macd_values() {
        let bars = make_bars(&[1.0]);
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Macd {
                short: 1,
                long: 2,
                signal: 1,
            },
            values: vec![IndicatorPoint {
                timestamp: bars[0].timestamp,
                valid: true,
                value: IndicatorValue::Macd {
                    line: 1.0,
                    signal: 0.5,
                    histogram: 0.5,
                },
            }],
        };
        assert_eq!(series.simple_at(0), None);
    }
}
