//! Result persistence port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlgoTraderError;

/// Port for persisting a run's trade ledger and equity curve.
pub trait ReportPort {
    fn write_trades(&self, result: &BacktestResult, strategy: &str) -> Result<(), AlgoTraderError>;

    fn write_equity(&self, result: &BacktestResult, strategy: &str) -> Result<(), AlgoTraderError>;

    /// Default implementation: trades first, then the equity curve.
    fn write(&self, result: &BacktestResult, strategy: &str) -> Result<(), AlgoTraderError> {
        self.write_trades(result, strategy)?;
        self.write_equity(result, strategy)
    }
}
