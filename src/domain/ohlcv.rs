//! Price bar representation and input validation.

use chrono::NaiveDateTime;

use super::error::AlgoTraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Close prices in bar order.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Reject series the simulator cannot run on: empty, or a close that is not
/// a positive finite number.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), AlgoTraderError> {
    if bars.is_empty() {
        return Err(AlgoTraderError::EmptySeries);
    }
    for (index, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(AlgoTraderError::InvalidPrice {
                index,
                value: bar.close,
            });
        }
    }
    Ok(())
}
