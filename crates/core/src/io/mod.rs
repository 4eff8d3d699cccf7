//! File-level utilities shared by every step.
//!
//! - Path template expansion (`{tb}/Master_TB_{period}.xlsx`)
//! - SHA-256 content hashing for audit logs
//! - Tabular read/write behind a backend chosen once at startup

mod delimited;
mod error;
mod hash;
mod store;
mod table;
mod template;
#[cfg(feature = "xlsx")]
mod workbook;

pub use delimited::DelimitedCodec;
pub use error::TableError;
pub use hash::file_hash;
pub use store::{TableCodec, TableStore};
pub use table::{Record, Table};
pub use template::{TemplateError, expand};
#[cfg(feature = "xlsx")]
pub use workbook::WorkbookCodec;
