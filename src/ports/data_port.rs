//! Price data access port trait.

use crate::domain::error::AlgoTraderError;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// Bars in chronological order with no duplicate timestamps.
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, AlgoTraderError>;

    /// Human-readable description of where the bars come from.
    fn source(&self) -> String;
}
