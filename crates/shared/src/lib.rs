//! Shared types, errors, and configuration for Closeflow.
//!
//! This crate provides common types used across all other crates:
//! - Reporting periods (`YYYYMM`)
//! - Decimal amount parsing, rounding, and display
//! - Application-wide error types
//! - Pipeline configuration loading

pub mod config;
pub mod error;
pub mod types;

pub use config::{PipelineConfig, StepConfig};
pub use error::{AppError, AppResult};
pub use types::{Period, PeriodError};
