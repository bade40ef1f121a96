//! Trailing volatility of simple returns.
//!
//! r[i] = C[i]/C[i-1] - 1 (undefined at bar 0).
//! VOL(n)[i] = sample standard deviation (n - 1 denominator) of r[i-n+1..=i].
//! Warmup: bars 0..n are invalid, since the window needs n defined returns.
//! A window below 2 never produces a value.

use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, PriceBar};

/// Sample standard deviation of a full window, summed oldest to newest.
pub(crate) fn sample_stddev<'a, I>(window: I) -> f64
where
    I: Iterator<Item = &'a f64> + Clone,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for r in window.clone() {
        sum += r;
        count += 1;
    }
    let mean = sum / count as f64;

    let mut sq = 0.0;
    for r in window {
        let diff = r - mean;
        sq += diff * diff;
    }
    (sq / (count - 1) as f64).sqrt()
}

pub fn volatility_values(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 || closes.len() <= window {
        return vec![None; closes.len()];
    }

    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();

    let mut values = vec![None; window];
    for end in (window - 1)..returns.len() {
        let start = end + 1 - window;
        values.push(Some(sample_stddev(returns[start..=end].iter())));
    }
    values
}

pub fn calculate_volatility(bars: &[PriceBar], window: usize) -> IndicatorSeries {
    let closes = closes(bars);
    simple_series(
        bars,
        IndicatorType::Volatility(window),
        &volatility_values(&closes, window),
    )
}
