//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(short) - EMA(long)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: short=12, long=26, signal=9.
//! The EMAs are seeded with the first value, so every bar is valid.

use crate::domain::indicator::{
    ema_values, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::{closes, PriceBar};

pub const DEFAULT_SHORT: usize = 12;
pub const DEFAULT_LONG: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacdLines {
    pub ema_short: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_lines(closes: &[f64], short: usize, long: usize, signal: usize) -> MacdLines {
    if closes.is_empty() || short == 0 || long == 0 || signal == 0 {
        return MacdLines::default();
    }

    let ema_short = ema_values(closes, short);
    let ema_long = ema_values(closes, long);
    let macd: Vec<f64> = ema_short
        .iter()
        .zip(&ema_long)
        .map(|(s, l)| s - l)
        .collect();
    let signal_line = ema_values(&macd, signal);
    let histogram = macd
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdLines {
        ema_short,
        ema_long,
        macd,
        signal: signal_line,
        histogram,
    }
}

pub fn calculate_macd(
    bars: &[PriceBar],
    short: usize,
    long: usize,
    signal: usize,
) -> IndicatorSeries {
    let lines = macd_lines(&closes(bars), short, long, signal);
    macd_series(bars, &lines, short, long, signal)
}

/// Series over `bars` from lines already computed with the same parameters.
pub(crate) fn macd_series(
    bars: &[PriceBar],
    lines: &MacdLines,
    short: usize,
    long: usize,
    signal: usize,
) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(lines.macd.iter().zip(&lines.signal).zip(&lines.histogram))
        .map(|(bar, ((&line, &signal), &histogram))| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Macd {
                line,
                signal,
                histogram,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Macd {
            short,
            long,
            signal,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;
    use approx::assert_relative_eq;

    fn trending(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let lines = macd_lines(&trending(40), 12, 26, 9);
        for i in 0..40 {
            assert_relative_eq!(lines.histogram[i], lines.macd[i] - lines.signal[i]);
        }
    }

    #[test]
    fn macd_line_is_ema_short_minus_ema_long() {
        let closes = trending(10);
        let lines = macd_lines(&closes, 3, 5, 2);
        let fast = ema_values(&closes, 3);
        let slow = ema_values(&closes, 5);
        for i in 0..closes.len() {
            assert_relative_eq!(lines.macd[i], fast[i] - slow[i]);
        }
    }

    #[test]
    fn macd_starts_at_zero() {
        let lines = macd_lines(&[50.0, 51.0, 49.0], 2, 4, 2);
        assert_relative_eq!(lines.macd[0], 0.0);
        assert_relative_eq!(lines.signal[0], 0.0);
        assert_relative_eq!(lines.histogram[0], 0.0);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let lines = macd_lines(&trending(30), 12, 26, 9);
        assert!(lines.macd[1..].iter().all(|&m| m > 0.0));
    }

    #[test]
    fn macd_series_shape() {
        let bars = make_bars(&trending(5));
        let series = calculate_macd(&bars, 5, 10, 3);

        assert_eq!(series.len(), 5);
        assert!(series.values.iter().all(|p| p.valid));
        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                short: 5,
                long: 10,
                signal: 3
            }
        );
    }

    #[test]
    fn macd_empty_bars() {
        assert!(calculate_macd(&[], DEFAULT_SHORT, DEFAULT_LONG, DEFAULT_SIGNAL).is_empty());
    }

    #[test]
    fn macd_zero_period() {
        let closes = trending(3);
        assert!(macd_lines(&closes, 0, 26, 9).macd.is_empty());
        assert!(macd_lines(&closes, 12, 0, 9).macd.is_empty());
        assert!(macd_lines(&closes, 12, 26, 0).macd.is_empty());
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_SHORT, 12);
        assert_eq!(DEFAULT_LONG, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }
}
