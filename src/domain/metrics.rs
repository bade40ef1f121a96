//! Performance metrics over a trade ledger and equity curve.
//!
//! Reported ratios are rounded to 2 decimals; the `compute_*` helpers return
//! full precision.

use std::fmt;

use super::position::Trade;
use super::state::EquityPoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Gross profit over gross loss; unbounded when nothing was lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Finite(f64),
    Unbounded,
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(v) => write!(f, "{:.2}", v),
            ProfitFactor::Unbounded => write!(f, "inf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_trades: usize,
    /// Percentage of trades with positive profit.
    pub win_rate: f64,
    pub profit_factor: ProfitFactor,
    /// Mean win over mean loss magnitude; `None` without a non-zero mean loss.
    pub avg_rr: Option<f64>,
    /// Largest peak-to-trough decline of the equity curve, in percent.
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
}

/// Outcome of [`summarize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Performance {
    /// The ledger holds no trades to measure.
    NoData,
    Measured(Metrics),
}

impl Performance {
    pub fn metrics(&self) -> Option<&Metrics> {
        match self {
            Performance::Measured(m) => Some(m),
            Performance::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Performance::NoData)
    }
}

pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        value
    }
}

/// Summarize with a zero risk-free rate.
pub fn summarize(trades: &[Trade], equity_curve: &[EquityPoint]) -> Performance {
    summarize_with_rate(trades, equity_curve, 0.0)
}

/// `risk_free_rate` is per period and is subtracted from the mean return.
pub fn summarize_with_rate(
    trades: &[Trade],
    equity_curve: &[EquityPoint],
    risk_free_rate: f64,
) -> Performance {
    let measured: Vec<&Trade> = trades.iter().filter(|t| !t.profit.is_nan()).collect();
    if measured.is_empty() {
        return Performance::NoData;
    }

    let profits: Vec<f64> = measured.iter().map(|t| t.profit).collect();
    let total_trades = measured.len();
    let wins = measured.iter().filter(|t| t.is_win()).count();
    let win_rate = wins as f64 / total_trades as f64 * 100.0;

    Performance::Measured(Metrics {
        total_trades,
        win_rate: round2(win_rate),
        profit_factor: match compute_profit_factor(&profits) {
            ProfitFactor::Finite(v) => ProfitFactor::Finite(round2(v)),
            ProfitFactor::Unbounded => ProfitFactor::Unbounded,
        },
        avg_rr: compute_avg_rr(&profits).map(round2),
        max_drawdown_pct: round2(compute_max_drawdown(equity_curve) * 100.0),
        sharpe_ratio: round2(compute_sharpe(equity_curve, risk_free_rate)),
    })
}

/// Trades with profit <= 0 count as losing.
pub fn compute_profit_factor(profits: &[f64]) -> ProfitFactor {
    let gross_win: f64 = profits.iter().filter(|&&p| p > 0.0).sum();
    let gross_loss: f64 = profits.iter().filter(|&&p| p <= 0.0).sum::<f64>().abs();

    if gross_loss > 0.0 {
        ProfitFactor::Finite(gross_win / gross_loss)
    } else if gross_win > 0.0 {
        ProfitFactor::Unbounded
    } else {
        ProfitFactor::Finite(0.0)
    }
}

pub fn compute_avg_rr(profits: &[f64]) -> Option<f64> {
    let (wins, losses): (Vec<f64>, Vec<f64>) = profits.iter().partition(|&&p| p > 0.0);

    let avg_win = if wins.is_empty() {
        0.0
    } else {
        wins.iter().sum::<f64>() / wins.len() as f64
    };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        (losses.iter().sum::<f64>() / losses.len() as f64).abs()
    };

    (avg_loss != 0.0).then(|| avg_win / avg_loss)
}

/// Largest fractional decline from the running peak.
pub fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.balance;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.balance > peak {
            peak = point.balance;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.balance) / peak);
        }
    }
    max_dd
}

/// Bar-over-bar simple returns of the balance series.
pub fn period_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].balance;
            if prev > 0.0 {
                (w[1].balance - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

/// mean/stdev * sqrt(252) with the population deviation; 0 for flat equity.
pub fn compute_sharpe(equity_curve: &[EquityPoint], risk_free_rate: f64) -> f64 {
    let returns = period_returns(equity_curve);
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean - risk_free_rate) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
