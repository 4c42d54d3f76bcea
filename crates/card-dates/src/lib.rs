//! Card Dates - issue and expiration date handling
//!
//! This crate provides:
//! - ISO (`YYYY-MM-DD`) date parsing for request input
//! - Issue date resolution against an injectable clock
//! - Expiration date arithmetic (issue date + one week)
//! - Display formatting for template fields
//!
//! # Example
//!
//! ```
//! use card_dates::{DateCalculator, FixedClock};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 1, 27).unwrap();
//! let calc = DateCalculator::new(FixedClock::new(today));
//!
//! let dates = calc.resolve(None).unwrap();
//! assert_eq!(calc.format_for_display(dates.expiration_date), "2026-02-03");
//! ```

mod calculator;
mod clock;

pub use calculator::{
    compute_expiration, parse_iso_date, validate_display_format, DateCalculator, ResolvedDates,
    DEFAULT_DISPLAY_FORMAT, EXPIRATION_OFFSET_DAYS, ISO_DATE_FORMAT,
};
pub use clock::{Clock, FixedClock, SystemClock};

use thiserror::Error;

/// Errors that can occur during date handling
#[derive(Debug, Error)]
pub enum DateError {
    #[error("Invalid date '{input}': expected YYYY-MM-DD ({reason})")]
    InvalidDate { input: String, reason: String },

    #[error("Invalid display format: {0}")]
    InvalidFormat(String),

    #[error("Date out of range: {0} + {1} days")]
    OutOfRange(chrono::NaiveDate, u64),
}

/// Result type for date operations
pub type Result<T> = std::result::Result<T, DateError>;
