//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod state;
pub mod backtest;
pub mod metrics;
pub mod comparison;
pub mod config_validation;
pub mod error;
