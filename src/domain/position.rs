//! Position tracking and the closed-trade record.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    #[default]
    Flat,
    Long {
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
    },
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long { .. })
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            Position::Long { entry_price, .. } => Some(*entry_price),
            Position::Flat => None,
        }
    }
}

/// A completed long round trip. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub exit_timestamp: NaiveDateTime,
    pub exit_price: f64,
    pub profit: f64,
    pub balance_after: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    /// Price return of the round trip in percent.
    pub fn return_pct(&self) -> f64 {
        (self.exit_price - self.entry_price) / self.entry_price * 100.0
    }
}
