//! RSI (Relative Strength Index) indicator.
//!
//! Simple rolling means, not Wilder's smoothing:
//! - gain[i] = max(C[i] - C[i-1], 0), loss[i] = max(C[i-1] - C[i], 0)
//! - avg_gain/avg_loss = arithmetic mean over the trailing `period` changes,
//!   shrinking to however many changes exist near the start of the series
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss)); avg_loss == 0 gives 100
//!
//! Bar 0 has no price change and is invalid; every later bar is valid.

use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, PriceBar};

/// Split a price change into its (gain, loss) parts.
pub fn gain_loss(change: f64) -> (f64, f64) {
    (change.max(0.0), (-change).max(0.0))
}

/// RSI from averaged gain and loss.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// Mean of a window, summed oldest to newest.
pub(crate) fn window_mean<'a>(window: impl Iterator<Item = &'a f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in window {
        sum += v;
        count += 1;
    }
    sum / count as f64
}

pub fn rsi_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.len() < 2 {
        return vec![None; closes.len()];
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| gain_loss(w[1] - w[0]))
        .unzip();

    let mut values = Vec::with_capacity(closes.len());
    values.push(None);

    for end in 0..gains.len() {
        let start = (end + 1).saturating_sub(period);
        let avg_gain = window_mean(gains[start..=end].iter());
        let avg_loss = window_mean(losses[start..=end].iter());
        values.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }
    values
}

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let closes = closes(bars);
    simple_series(bars, IndicatorType::Rsi(period), &rsi_values(&closes, period))
}
