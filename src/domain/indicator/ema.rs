//! Exponential Moving Average indicator.
//!
//! alpha = 2/(span+1), EMA[0] = C[0], then EMA[i] = alpha*C[i] + (1-alpha)*EMA[i-1].
//! No warm-up: every bar is valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{closes, PriceBar};

/// Smoothing factor for a given span.
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// EMA over raw values. Empty output for an empty input or a zero span.
pub fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = smoothing_factor(span);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &value in &values[1..] {
        ema = alpha * value + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

pub fn calculate_ema(bars: &[PriceBar], span: usize) -> IndicatorSeries {
    let closes = closes(bars);
    let values = ema_values(&closes, span)
        .into_iter()
        .zip(bars)
        .map(|(ema, bar)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Simple(ema),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}
