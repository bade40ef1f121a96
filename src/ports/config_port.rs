//! Configuration access port trait.

use crate::domain::error::AlgoTraderError;

/// Typed lookups return `default` for an absent key and an error for a
/// present value that does not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, AlgoTraderError>;
    fn get_double(&self, section: &str, key: &str, default: f64)
    -> Result<f64, AlgoTraderError>;
}
