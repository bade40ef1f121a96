//! Backtest simulator: a deterministic fold over bars and crossover pulses.
//!
//! Per bar from index 1:
//! 1. peak = max(peak, balance); stop for good once (peak - balance)/peak > max_drawdown
//! 2. risk_factor = min(1, max_risk_per_trade / max(volatility, floor)), volatility
//!    falling back to the floor during warm-up
//! 3. position_size = balance * risk_factor
//! 4. crossover +1 while flat opens a long at the close; -1 while long closes it,
//!    crediting (exit - entry)/entry * position_size
//! 5. one equity point per simulated bar

use chrono::NaiveDateTime;

use super::error::AlgoTraderError;
use super::indicator::calculate_volatility;
use super::ohlcv::{validate_series, PriceBar};
use super::position::{Position, Trade};
use super::signal::{SignalFrame, SignalGenerator};
use super::state::{EquityPoint, SimulationState};

pub const DEFAULT_INITIAL_BALANCE: f64 = 1000.0;
pub const DEFAULT_MAX_RISK_PER_TRADE: f64 = 0.02;
pub const DEFAULT_MAX_DRAWDOWN: f64 = 0.10;
pub const DEFAULT_VOLATILITY_WINDOW: usize = 10;
pub const DEFAULT_VOLATILITY_FLOOR: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub max_risk_per_trade: f64,
    pub max_drawdown: f64,
    pub volatility_window: usize,
    pub volatility_floor: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            max_risk_per_trade: DEFAULT_MAX_RISK_PER_TRADE,
            max_drawdown: DEFAULT_MAX_DRAWDOWN,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            volatility_floor: DEFAULT_VOLATILITY_FLOOR,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), AlgoTraderError> {
        let invalid = |key: &str, reason: &str| AlgoTraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if !(self.initial_balance.is_finite() && self.initial_balance > 0.0) {
            return Err(invalid("initial_balance", "initial_balance must be positive"));
        }
        if !(self.max_risk_per_trade > 0.0 && self.max_risk_per_trade <= 1.0) {
            return Err(invalid(
                "max_risk_per_trade",
                "max_risk_per_trade must be in (0, 1]",
            ));
        }
        if !(self.max_drawdown > 0.0 && self.max_drawdown < 1.0) {
            return Err(invalid("max_drawdown", "max_drawdown must be in (0, 1)"));
        }
        if self.volatility_window < 2 {
            return Err(invalid(
                "volatility_window",
                "volatility_window must be at least 2",
            ));
        }
        if !(self.volatility_floor.is_finite() && self.volatility_floor > 0.0) {
            return Err(invalid("volatility_floor", "volatility_floor must be positive"));
        }
        Ok(())
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Every bar was simulated.
    Completed,
    /// The drawdown breaker fired before `bar_index`; that bar and later ones
    /// were not simulated.
    DrawdownLimit {
        bar_index: usize,
        timestamp: NaiveDateTime,
        drawdown: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub final_balance: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Position held when the run ended; an open long is not marked to market.
    pub final_position: Position,
    pub termination: Termination,
}

impl BacktestResult {
    pub fn stopped_early(&self) -> bool {
        matches!(self.termination, Termination::DrawdownLimit { .. })
    }

    pub fn total_trades(&self) -> usize {
        self.trades.len()
    }

    /// (final - initial) / initial in percent.
    pub fn total_return_pct(&self, initial_balance: f64) -> f64 {
        (self.final_balance - initial_balance) / initial_balance * 100.0
    }
}

/// Fraction of the balance allocated on a bar with the given volatility.
pub fn risk_factor(volatility: Option<f64>, config: &BacktestConfig) -> f64 {
    let floor = config.volatility_floor;
    let vol = match volatility {
        Some(v) if v.is_finite() => v.max(floor),
        _ => floor,
    };
    (config.max_risk_per_trade / vol).min(1.0)
}

fn check_len<T>(series: &str, values: &[T], expected: usize) -> Result<(), AlgoTraderError> {
    if values.len() != expected {
        return Err(AlgoTraderError::LengthMismatch {
            series: series.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

/// Run the simulator over pre-computed crossover and volatility series.
///
/// All three inputs must have the same length. A `None` crossover is treated
/// as no signal and a `None` volatility as the floor.
pub fn simulate(
    bars: &[PriceBar],
    crossover: &[Option<i8>],
    volatility: &[Option<f64>],
    config: &BacktestConfig,
) -> Result<BacktestResult, AlgoTraderError> {
    config.validate()?;
    validate_series(bars)?;
    check_len("crossover", crossover, bars.len())?;
    check_len("volatility", volatility, bars.len())?;

    let mut state = SimulationState::new(config.initial_balance);
    let mut termination = Termination::Completed;

    for i in 1..bars.len() {
        let bar = &bars[i];

        let drawdown = state.update_drawdown();
        if drawdown > config.max_drawdown {
            tracing::warn!(
                bar = i,
                timestamp = %bar.timestamp,
                drawdown,
                limit = config.max_drawdown,
                "max drawdown reached, stopping simulation"
            );
            termination = Termination::DrawdownLimit {
                bar_index: i,
                timestamp: bar.timestamp,
                drawdown,
            };
            break;
        }

        let position_size = state.balance() * risk_factor(volatility[i], config);

        match crossover[i] {
            Some(1) if state.position().is_flat() => {
                state.open_long(bar.close, bar.timestamp);
                tracing::debug!(bar = i, price = bar.close, "open long");
            }
            Some(-1) if state.position().is_long() => {
                if let Some(trade) = state.close_long(bar.close, bar.timestamp, position_size) {
                    tracing::debug!(
                        bar = i,
                        entry = trade.entry_price,
                        exit = trade.exit_price,
                        profit = trade.profit,
                        balance = trade.balance_after,
                        "close long"
                    );
                }
            }
            _ => {}
        }

        state.record_equity(bar.timestamp);
    }

    let (final_balance, final_position, trades, equity_curve) = state.into_parts();
    Ok(BacktestResult {
        final_balance,
        trades,
        equity_curve,
        final_position,
        termination,
    })
}

/// Generate signals for `bars` and simulate them, using the configured
/// volatility window for sizing.
pub fn run_strategy(
    bars: &[PriceBar],
    generator: &dyn SignalGenerator,
    config: &BacktestConfig,
) -> Result<(SignalFrame, BacktestResult), AlgoTraderError> {
    config.validate()?;
    validate_series(bars)?;

    let frame = generator.generate(bars);
    let volatility = calculate_volatility(bars, config.volatility_window).simple_values();
    tracing::info!(
        strategy = generator.name(),
        bars = bars.len(),
        pulses = frame.pulse_count(),
        "signals generated"
    );

    let result = simulate(bars, &frame.crossover, &volatility, config)?;
    tracing::info!(
        strategy = generator.name(),
        trades = result.total_trades(),
        final_balance = result.final_balance,
        stopped_early = result.stopped_early(),
        "backtest complete"
    );
    Ok((frame, result))
}
