//! Currency translation and exchange rates.

pub mod conversion;
pub mod rates;

#[cfg(test)]
mod props;

pub use conversion::{REPORTING_DECIMAL_PLACES, Translation, convert_amount, translate};
pub use rates::{FxRateTable, RateError};
