//! Configuration validation and typed loading.
//!
//! Every key is optional and falls back to its default; a present value that
//! does not parse or is out of range is rejected before any simulation runs.

use std::fmt;
use std::str::FromStr;

use crate::domain::backtest::{
    BacktestConfig, DEFAULT_INITIAL_BALANCE, DEFAULT_MAX_DRAWDOWN, DEFAULT_MAX_RISK_PER_TRADE,
    DEFAULT_VOLATILITY_FLOOR, DEFAULT_VOLATILITY_WINDOW,
};
use crate::domain::error::AlgoTraderError;
use crate::domain::indicator::macd::{DEFAULT_LONG, DEFAULT_SHORT, DEFAULT_SIGNAL};
use crate::domain::signal::{
    EmaCrossover, EmaRsi, MacdCrossover, Strategy, DEFAULT_FAST_WINDOW, DEFAULT_MACD_PULSE,
    DEFAULT_RSI_BUY_LEVEL, DEFAULT_RSI_PERIOD, DEFAULT_RSI_SELL_LEVEL, DEFAULT_SLOW_WINDOW,
};
use crate::ports::config_port::ConfigPort;

/// Strategy names accepted in `[strategy] kind` and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    EmaCrossover,
    EmaRsi,
    Macd,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::EmaCrossover,
        StrategyKind::EmaRsi,
        StrategyKind::Macd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::EmaCrossover => "ema_crossover",
            StrategyKind::EmaRsi => "ema_rsi",
            StrategyKind::Macd => "macd",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = AlgoTraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ema_crossover" | "ema" => Ok(StrategyKind::EmaCrossover),
            "ema_rsi" => Ok(StrategyKind::EmaRsi),
            "macd" => Ok(StrategyKind::Macd),
            other => Err(invalid(
                "strategy",
                "kind",
                format!(
                    "unknown strategy '{}', expected one of ema_crossover, ema_rsi, macd",
                    other
                ),
            )),
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AlgoTraderError {
    AlgoTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    load_backtest_config(config)?;
    load_risk_free_rate(config)?;
    Ok(())
}

/// Validates the selected kind and the parameters of every strategy.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    strategy_kind(config)?;
    load_all_strategies(config)?;
    Ok(())
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AlgoTraderError> {
    let backtest = BacktestConfig {
        initial_balance: config.get_double(
            "backtest",
            "initial_balance",
            DEFAULT_INITIAL_BALANCE,
        )?,
        max_risk_per_trade: config.get_double(
            "backtest",
            "max_risk_per_trade",
            DEFAULT_MAX_RISK_PER_TRADE,
        )?,
        max_drawdown: config.get_double("backtest", "max_drawdown", DEFAULT_MAX_DRAWDOWN)?,
        volatility_window: read_count(
            config,
            "backtest",
            "volatility_window",
            DEFAULT_VOLATILITY_WINDOW,
        )?,
        volatility_floor: config.get_double(
            "backtest",
            "volatility_floor",
            DEFAULT_VOLATILITY_FLOOR,
        )?,
    };
    backtest.validate()?;
    Ok(backtest)
}

/// Per-period rate subtracted from mean returns in the Sharpe ratio.
pub fn load_risk_free_rate(config: &dyn ConfigPort) -> Result<f64, AlgoTraderError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0)?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(value)
}

pub fn strategy_kind(config: &dyn ConfigPort) -> Result<StrategyKind, AlgoTraderError> {
    match config.get_string("strategy", "kind") {
        Some(s) if !s.trim().is_empty() => s.parse(),
        _ => Ok(StrategyKind::EmaRsi),
    }
}

pub fn load_strategy(
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<Strategy, AlgoTraderError> {
    let strategy = match kind {
        StrategyKind::EmaCrossover => {
            let (fast_window, slow_window) = ema_windows(config)?;
            Strategy::EmaCrossover(EmaCrossover {
                fast_window,
                slow_window,
            })
        }
        StrategyKind::EmaRsi => {
            let (fast_window, slow_window) = ema_windows(config)?;
            let rsi_period = read_count(config, "strategy", "rsi_period", DEFAULT_RSI_PERIOD)?;
            let (buy_level, sell_level) = rsi_levels(config)?;
            Strategy::EmaRsi(EmaRsi {
                fast_window,
                slow_window,
                rsi_period,
                buy_level,
                sell_level,
            })
        }
        StrategyKind::Macd => Strategy::Macd(macd_params(config)?),
    };
    Ok(strategy)
}

/// One strategy of each kind, sharing the configured parameters.
pub fn load_all_strategies(config: &dyn ConfigPort) -> Result<Vec<Strategy>, AlgoTraderError> {
    StrategyKind::ALL
        .iter()
        .map(|&kind| load_strategy(config, kind))
        .collect()
}

fn read_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, AlgoTraderError> {
    let value = config.get_int(section, key, default as i64)?;
    match usize::try_from(value) {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(invalid(section, key, format!("{} must be at least 1", key))),
    }
}

fn ema_windows(config: &dyn ConfigPort) -> Result<(usize, usize), AlgoTraderError> {
    let fast = read_count(config, "strategy", "fast_window", DEFAULT_FAST_WINDOW)?;
    let slow = read_count(config, "strategy", "slow_window", DEFAULT_SLOW_WINDOW)?;
    if fast >= slow {
        return Err(invalid(
            "strategy",
            "fast_window",
            "fast_window must be less than slow_window",
        ));
    }
    Ok((fast, slow))
}

fn rsi_levels(config: &dyn ConfigPort) -> Result<(f64, f64), AlgoTraderError> {
    let buy = config.get_double("strategy", "rsi_buy_level", DEFAULT_RSI_BUY_LEVEL)?;
    let sell = config.get_double("strategy", "rsi_sell_level", DEFAULT_RSI_SELL_LEVEL)?;
    if !(0.0..=100.0).contains(&buy) {
        return Err(invalid(
            "strategy",
            "rsi_buy_level",
            "rsi_buy_level must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&sell) {
        return Err(invalid(
            "strategy",
            "rsi_sell_level",
            "rsi_sell_level must be between 0 and 100",
        ));
    }
    if sell > buy {
        return Err(invalid(
            "strategy",
            "rsi_sell_level",
            "rsi_sell_level must not exceed rsi_buy_level",
        ));
    }
    Ok((buy, sell))
}

fn macd_params(config: &dyn ConfigPort) -> Result<MacdCrossover, AlgoTraderError> {
    let short = read_count(config, "strategy", "macd_short", DEFAULT_SHORT)?;
    let long = read_count(config, "strategy", "macd_long", DEFAULT_LONG)?;
    let signal = read_count(config, "strategy", "macd_signal", DEFAULT_SIGNAL)?;
    if short >= long {
        return Err(invalid(
            "strategy",
            "macd_short",
            "macd_short must be less than macd_long",
        ));
    }

    let pulse = match config.get_int("strategy", "macd_pulse", DEFAULT_MACD_PULSE as i64)? {
        1 => 1,
        2 => 2,
        _ => {
            return Err(invalid(
                "strategy",
                "macd_pulse",
                "macd_pulse must be 1 or 2",
            ));
        }
    };

    Ok(MacdCrossover {
        short,
        long,
        signal,
        pulse,
    })
}
