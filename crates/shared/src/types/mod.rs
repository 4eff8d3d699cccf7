//! Common types used across the pipeline.

pub mod amount;
pub mod period;

pub use amount::{format_currency, parse_amount, round_amount, to_fixed};
pub use period::{Period, PeriodError};
