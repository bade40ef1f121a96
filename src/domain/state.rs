//! Simulation state: balance, running peak, position and the ledgers.
//!
//! Only the backtest simulator mutates this. The mutators uphold:
//! - `peak_balance >= balance`
//! - a long position always carries its entry price, and no second entry
//! - one trade per long-to-flat transition

use chrono::NaiveDateTime;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    balance: f64,
    peak_balance: f64,
    position: Position,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
}

impl SimulationState {
    pub fn new(initial_balance: f64) -> Self {
        SimulationState {
            balance: initial_balance,
            peak_balance: initial_balance,
            position: Position::Flat,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn peak_balance(&self) -> f64 {
        self.peak_balance
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Raise the peak to the current balance and return the drawdown from it.
    pub(super) fn update_drawdown(&mut self) -> f64 {
        self.peak_balance = self.peak_balance.max(self.balance);
        (self.peak_balance - self.balance) / self.peak_balance
    }

    /// Go long at `price`. No-op when already long.
    pub(super) fn open_long(&mut self, price: f64, timestamp: NaiveDateTime) -> bool {
        if self.position.is_long() {
            return false;
        }
        self.position = Position::Long {
            entry_price: price,
            entry_timestamp: timestamp,
        };
        true
    }

    /// Close the long at `price`, crediting the return on `position_size`.
    pub(super) fn close_long(
        &mut self,
        price: f64,
        timestamp: NaiveDateTime,
        position_size: f64,
    ) -> Option<&Trade> {
        let Position::Long {
            entry_price,
            entry_timestamp,
        } = self.position
        else {
            return None;
        };

        let profit = (price - entry_price) / entry_price * position_size;
        self.balance += profit;
        self.position = Position::Flat;
        self.trades.push(Trade {
            entry_timestamp,
            entry_price,
            exit_timestamp: timestamp,
            exit_price: price,
            profit,
            balance_after: self.balance,
        });
        self.trades.last()
    }

    pub(super) fn record_equity(&mut self, timestamp: NaiveDateTime) {
        self.equity_curve.push(EquityPoint {
            timestamp,
            balance: self.balance,
        });
    }

    pub(super) fn into_parts(self) -> (f64, Position, Vec<Trade>, Vec<EquityPoint>) {
        (self.balance, self.position, self.trades, self.equity_curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_state() {
        let state = SimulationState::new(1000.0);
        assert_eq!(state.balance(), 1000.0);
        assert_eq!(state.peak_balance(), 1000.0);
        assert!(state.position().is_flat());
        assert!(state.trades().is_empty());
        assert!(state.equity_curve().is_empty());
    }

    #[test]
    fn open_long_once() {
        let mut state = SimulationState::new(1000.0);
        assert!(state.open_long(100.0, ts(1)));
        assert!(!state.open_long(120.0, ts(2)));
        assert_eq!(state.position().entry_price(), Some(100.0));
    }

    #[test]
    fn close_long_records_trade() {
        let mut state = SimulationState::new(1000.0);
        state.open_long(100.0, ts(1));
        let trade = state.close_long(110.0, ts(3), 500.0).cloned().unwrap();

        assert!((trade.profit - 50.0).abs() < 1e-12);
        assert!((trade.balance_after - 1050.0).abs() < 1e-12);
        assert_eq!(trade.entry_timestamp, ts(1));
        assert_eq!(trade.exit_timestamp, ts(3));
        assert!(state.position().is_flat());
        assert_eq!(state.trades().len(), 1);
    }

    #[test]
    fn close_when_flat_is_noop() {
        let mut state = SimulationState::new(1000.0);
        assert!(state.close_long(110.0, ts(3), 500.0).is_none());
        assert_eq!(state.balance(), 1000.0);
        assert!(state.trades().is_empty());
    }

    #[test]
    fn drawdown_tracks_peak() {
        let mut state = SimulationState::new(1000.0);
        state.open_long(100.0, ts(1));
        state.close_long(120.0, ts(2), 1000.0);
        assert_eq!(state.update_drawdown(), 0.0);
        assert!((state.peak_balance() - 1200.0).abs() < 1e-9);

        state.open_long(100.0, ts(3));
        state.close_long(90.0, ts(4), 1200.0);
        let dd = state.update_drawdown();
        assert!((dd - 0.1).abs() < 1e-9);
        assert!(state.peak_balance() >= state.balance());
    }

    #[test]
    fn record_equity_snapshots_balance() {
        let mut state = SimulationState::new(1000.0);
        state.record_equity(ts(1));
        assert_eq!(
            state.equity_curve(),
            &[EquityPoint {
                timestamp: ts(1),
                balance: 1000.0
            }]
        );
    }
}
