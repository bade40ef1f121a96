//! CSV persistence of the trade ledger and equity curve.
//!
//! Files land in the output directory as `backtest_trades_<strategy>.csv` and
//! `equity_curve_<strategy>.csv`. The trades header is written even when the
//! ledger is empty.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlgoTraderError;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn trades_path(&self, strategy: &str) -> PathBuf {
        self.output_dir.join(format!("backtest_trades_{}.csv", strategy))
    }

    pub fn equity_path(&self, strategy: &str) -> PathBuf {
        self.output_dir.join(format!("equity_curve_{}.csv", strategy))
    }

    fn writer(&self, path: &Path) -> Result<csv::Writer<fs::File>, AlgoTraderError> {
        fs::create_dir_all(&self.output_dir)?;
        csv::Writer::from_path(path).map_err(|e| io::Error::from(e).into())
    }
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

impl ReportPort for CsvReportAdapter {
    fn write_trades(&self, result: &BacktestResult, strategy: &str) -> Result<(), AlgoTraderError> {
        let path = self.trades_path(strategy);
        let mut wtr = self.writer(&path)?;

        wtr.write_record(["timestamp", "entry", "exit", "profit", "balance"])
            .map_err(io::Error::from)?;
        for trade in &result.trades {
            wtr.write_record(&[
                format_timestamp(&trade.exit_timestamp),
                trade.entry_price.to_string(),
                trade.exit_price.to_string(),
                trade.profit.to_string(),
                trade.balance_after.to_string(),
            ])
            .map_err(io::Error::from)?;
        }
        wtr.flush()?;

        tracing::info!(path = %path.display(), trades = result.trades.len(), "wrote trade ledger");
        Ok(())
    }

    fn write_equity(&self, result: &BacktestResult, strategy: &str) -> Result<(), AlgoTraderError> {
        let path = self.equity_path(strategy);
        let mut wtr = self.writer(&path)?;

        wtr.write_record(["timestamp", "balance"])
            .map_err(io::Error::from)?;
        for point in &result.equity_curve {
            wtr.write_record(&[format_timestamp(&point.timestamp), point.balance.to_string()])
                .map_err(io::Error::from)?;
        }
        wtr.flush()?;

        tracing::info!(
            path = %path.display(),
            points = result.equity_curve.len(),
            "wrote equity curve"
        );
        Ok(())
    }
}
