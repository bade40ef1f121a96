//! Incremental indicator state for tick-by-tick updates.
//!
//! Each type keeps only what its recursion needs: the previous EMA value, or a
//! bounded ring buffer of the last `n` changes. Feeding a series one value at
//! a time yields exactly the batch result for the same prefix.

use std::collections::VecDeque;

use super::ema::smoothing_factor;
use super::rsi::{gain_loss, rsi_from_averages, window_mean};
use super::volatility::sample_stddev;

#[derive(Debug, Clone, PartialEq)]
pub struct EmaState {
    alpha: f64,
    value: Option<f64>,
}

impl EmaState {
    pub fn new(span: usize) -> Self {
        Self {
            alpha: smoothing_factor(span),
            value: None,
        }
    }

    pub fn update(&mut self, price: f64) -> f64 {
        let next = match self.value {
            None => price,
            Some(prev) => self.alpha * price + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

#[derive(Debug, Clone)]
pub struct RollingRsi {
    period: usize,
    prev_close: Option<f64>,
    gains: VecDeque<f64>,
    losses: VecDeque<f64>,
}

impl RollingRsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            gains: VecDeque::with_capacity(period),
            losses: VecDeque::with_capacity(period),
        }
    }

    /// Push a close; `None` until a price change exists.
    pub fn update(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;
        if self.period == 0 {
            return None;
        }

        let (gain, loss) = gain_loss(close - prev);
        if self.gains.len() == self.period {
            self.gains.pop_front();
            self.losses.pop_front();
        }
        self.gains.push_back(gain);
        self.losses.push_back(loss);

        Some(rsi_from_averages(
            window_mean(self.gains.iter()),
            window_mean(self.losses.iter()),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct RollingVolatility {
    window: usize,
    prev_close: Option<f64>,
    returns: VecDeque<f64>,
}

impl RollingVolatility {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            prev_close: None,
            returns: VecDeque::with_capacity(window),
        }
    }

    /// Push a close; `None` until `window` returns have been seen.
    pub fn update(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;
        if self.window < 2 {
            return None;
        }

        if self.returns.len() == self.window {
            self.returns.pop_front();
        }
        self.returns.push_back((close - prev) / prev);

        (self.returns.len() == self.window).then(|| sample_stddev(self.returns.iter()))
    }
}
