//! Normalization of heterogeneous source files.
//!
//! Source systems name and format the same data differently. These helpers
//! bring a raw table into the canonical shape the steps rely on:
//! - Column aliasing with optional fuzzy matching
//! - Amount, currency and period coercion
//! - Entity and period inference from file names
//! - FX rate loading

pub mod aliases;
pub mod coerce;
pub mod filename;
pub mod fx_rates;
pub mod resolve;

#[cfg(test)]
mod props;

pub use aliases::{AliasEntry, COLUMN_ALIASES, aliases_for};
pub use coerce::{coerce_tb_types, normalize_period, split_amount};
pub use filename::{infer_entity_from_filename, infer_period_from_filename, is_tb_file_for_period};
pub use fx_rates::load_fx_rates;
pub use resolve::{FUZZY_THRESHOLD, resolve_columns, token_set_score};
