//! Reporting period identifier (`YYYYMM`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when parsing a reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Value is not six ASCII digits.
    #[error("period '{0}' must be six digits in YYYYMM form")]
    Format(String),

    /// Month component is outside 01..=12.
    #[error("period '{value}' has invalid month {month}")]
    Month {
        /// The rejected value.
        value: String,
        /// The parsed month.
        month: u32,
    },
}

/// A monthly reporting period such as `202501`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(String);

impl Period {
    /// Parses a strict `YYYYMM` value.
    pub fn parse(value: &str) -> Result<Self, PeriodError> {
        let trimmed = value.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PeriodError::Format(value.to_string()));
        }
        let month: u32 = trimmed[4..]
            .parse()
            .map_err(|_| PeriodError::Format(value.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(PeriodError::Month {
                value: value.to_string(),
                month,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the period as `YYYYMM`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the four-digit year component.
    #[must_use]
    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        // Validated on construction.
        self.0[4..].parse().unwrap_or(1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.0
    }
}
