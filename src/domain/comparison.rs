//! Side-by-side runs of several strategies over the same bars and config.

use super::backtest::{run_strategy, BacktestConfig, BacktestResult};
use super::error::AlgoTraderError;
use super::metrics::{summarize_with_rate, Performance};
use super::ohlcv::PriceBar;
use super::signal::SignalGenerator;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub strategy: &'static str,
    pub result: BacktestResult,
    pub performance: Performance,
}

impl ComparisonRow {
    pub fn total_return_pct(&self, initial_balance: f64) -> f64 {
        self.result.total_return_pct(initial_balance)
    }
}

/// Each strategy gets its own run; rows come back in input order.
pub fn compare_strategies<S: SignalGenerator>(
    bars: &[PriceBar],
    strategies: &[S],
    config: &BacktestConfig,
    risk_free_rate: f64,
) -> Result<Vec<ComparisonRow>, AlgoTraderError> {
    strategies
        .iter()
        .map(|strategy| {
            let (_, result) = run_strategy(bars, strategy, config)?;
            let performance =
                summarize_with_rate(&result.trades, &result.equity_curve, risk_free_rate);
            Ok(ComparisonRow {
                strategy: strategy.name(),
                result,
                performance,
            })
        })
        .collect()
}

/// Row with the highest final balance; the earliest wins a tie.
pub fn best_by_final_balance(rows: &[ComparisonRow]) -> Option<&ComparisonRow> {
    rows.iter().fold(None, |best: Option<&ComparisonRow>, row| match best {
        Some(b) if b.result.final_balance >= row.result.final_balance => Some(b),
        _ => Some(row),
    })
}
