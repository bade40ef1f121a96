#![allow(dead_code)]

use algotrader::domain::backtest::{BacktestConfig, BacktestResult};
use algotrader::domain::error::AlgoTraderError;
pub use algotrader::domain::ohlcv::PriceBar;
use algotrader::ports::data_port::DataPort;
use algotrader::ports::report_port::ReportPort;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;

pub struct MockDataPort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<PriceBar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, AlgoTraderError> {
        if let Some(reason) = &self.error {
            return Err(AlgoTraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }

    fn source(&self) -> String {
        "mock".to_string()
    }
}

/// Records every write instead of touching the filesystem.
pub struct MockReportPort {
    pub trades_calls: RefCell<Vec<(BacktestResult, String)>>,
    pub equity_calls: RefCell<Vec<(BacktestResult, String)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            trades_calls: RefCell::new(Vec::new()),
            equity_calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write_trades(&self, result: &BacktestResult, strategy: &str) -> Result<(), AlgoTraderError> {
        self.trades_calls
            .borrow_mut()
            .push((result.clone(), strategy.to_string()));
        Ok(())
    }

    fn write_equity(&self, result: &BacktestResult, strategy: &str) -> Result<(), AlgoTraderError> {
        self.equity_calls
            .borrow_mut()
            .push((result.clone(), strategy.to_string()));
        Ok(())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Bar `index` of a 4-hour series starting at [`start_time`].
pub fn bar_time(index: usize) -> NaiveDateTime {
    start_time() + Duration::hours(4 * index as i64)
}

pub fn make_bar(index: usize, close: f64) -> PriceBar {
    PriceBar {
        timestamp: bar_time(index),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
    }
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect()
}

/// Smooth oscillation with a slight upward drift.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 8.0 * (t * 0.3).sin() + 3.0 * (t * 0.11).cos() + t * 0.05
        })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig::default()
}

/// CSV text in the on-disk price format for the given closes.
pub fn price_csv(closes: &[f64]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for (i, bar) in make_bars(closes).iter().enumerate() {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            1000 + i
        ));
    }
    out
}
