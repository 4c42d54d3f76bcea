//! Issue/expiration date arithmetic and display formatting

use crate::{Clock, DateError, Result, SystemClock};
use chrono::format::{Item, StrftimeItems};
use chrono::{Days, NaiveDate};
use std::fmt::Write;

/// Days between issue and expiration
pub const EXPIRATION_OFFSET_DAYS: u64 = 7;

/// Input format accepted for date of birth and issue date
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Display format used for template fields unless configured otherwise
pub const DEFAULT_DISPLAY_FORMAT: &str = "%Y-%m-%d";

/// Issue date together with the expiration derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDates {
    pub issue_date: NaiveDate,
    pub expiration_date: NaiveDate,
}

impl ResolvedDates {
    /// Derive the expiration date from an issue date
    pub fn from_issue(issue_date: NaiveDate) -> Result<Self> {
        Ok(Self {
            issue_date,
            expiration_date: compute_expiration(issue_date)?,
        })
    }
}

/// Parse a `YYYY-MM-DD` date
///
/// Surrounding whitespace is ignored.
///
/// # Examples
/// ```
/// use card_dates::parse_iso_date;
/// assert!(parse_iso_date("1990-01-15").is_ok());
/// assert!(parse_iso_date("01/15/1990").is_err());
/// ```
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT).map_err(|e| DateError::InvalidDate {
        input: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Expiration date for a card issued on `issue_date`
///
/// Plain calendar arithmetic: month and year rollover are handled by chrono,
/// there is no time-of-day or time zone involved.
pub fn compute_expiration(issue_date: NaiveDate) -> Result<NaiveDate> {
    issue_date
        .checked_add_days(Days::new(EXPIRATION_OFFSET_DAYS))
        .ok_or(DateError::OutOfRange(issue_date, EXPIRATION_OFFSET_DAYS))
}

/// Resolves issue dates and formats dates for display
pub struct DateCalculator {
    clock: Box<dyn Clock>,
    display_format: String,
}

impl DateCalculator {
    /// Create a calculator using the default display format
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }

    /// Create a calculator reading the host clock
    pub fn system() -> Self {
        Self::new(SystemClock)
    }

    /// Use a custom strftime-style display format
    ///
    /// The format must only reference date fields; anything that needs a
    /// time of day (e.g. `%H`) is rejected here rather than at render time.
    pub fn with_display_format(mut self, format: &str) -> Result<Self> {
        validate_display_format(format)?;
        self.display_format = format.to_string();
        Ok(self)
    }

    /// The active display format
    pub fn display_format(&self) -> &str {
        &self.display_format
    }

    /// The supplied issue date, or today's date when none was given
    pub fn resolve_issue_date(&self, input: Option<NaiveDate>) -> NaiveDate {
        input.unwrap_or_else(|| self.clock.today())
    }

    /// Expiration date for `issue_date`
    pub fn compute_expiration(&self, issue_date: NaiveDate) -> Result<NaiveDate> {
        compute_expiration(issue_date)
    }

    /// Resolve the issue date and derive its expiration in one step
    pub fn resolve(&self, input: Option<NaiveDate>) -> Result<ResolvedDates> {
        ResolvedDates::from_issue(self.resolve_issue_date(input))
    }

    /// Render a date the way template fields show it
    pub fn format_for_display(&self, date: NaiveDate) -> String {
        date.format(&self.display_format).to_string()
    }
}

impl Default for DateCalculator {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for DateCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateCalculator")
            .field("today", &self.clock.today())
            .field("display_format", &self.display_format)
            .finish()
    }
}

/// Check that a strftime pattern can format a plain calendar date
pub fn validate_display_format(format: &str) -> Result<()> {
    if format.is_empty() {
        return Err(DateError::InvalidFormat("format is empty".to_string()));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(DateError::InvalidFormat(format!(
            "'{format}' is not a valid strftime pattern"
        )));
    }

    // Formatting a date with time-only specifiers fails inside Display
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).map_err(|_| {
        DateError::InvalidFormat(format!("'{format}' references fields a date does not have"))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expiration_is_one_week_later() {
        assert_eq!(compute_expiration(date(2026, 2, 1)).unwrap(), date(2026, 2, 8));
    }

    #[test]
    fn test_expiration_month_rollover() {
        assert_eq!(compute_expiration(date(2026, 1, 27)).unwrap(), date(2026, 2, 3));
    }

    #[test]
    fn test_expiration_year_rollover() {
        assert_eq!(compute_expiration(date(2025, 12, 28)).unwrap(), date(2026, 1, 4));
    }

    #[test]
    fn test_expiration_leap_day() {
        assert_eq!(compute_expiration(date(2028, 2, 25)).unwrap(), date(2028, 3, 3));
        assert_eq!(compute_expiration(date(2027, 2, 25)).unwrap(), date(2027, 3, 4));
    }

    #[test]
    fn test_expiration_out_of_range() {
        let result = compute_expiration(NaiveDate::MAX);
        assert!(matches!(result, Err(DateError::OutOfRange(_, 7))));
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("1990-01-15").unwrap(), date(1990, 1, 15));
        assert_eq!(parse_iso_date(" 1985-06-20\n").unwrap(), date(1985, 6, 20));
    }

    #[test]
    fn test_parse_iso_date_rejects_other_formats() {
        for raw in ["01/15/1990", "1990-13-01", "1990-02-30", "", "yesterday"] {
            let err = parse_iso_date(raw).unwrap_err();
            match err {
                DateError::InvalidDate { input, .. } => assert_eq!(input, raw),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_resolve_uses_supplied_date() {
        let calc = DateCalculator::new(FixedClock::new(date(2030, 1, 1)));
        assert_eq!(calc.resolve_issue_date(Some(date(2026, 2, 1))), date(2026, 2, 1));
    }

    #[test]
    fn test_resolve_defaults_to_clock() {
        let calc = DateCalculator::new(FixedClock::new(date(2026, 10, 17)));
        let dates = calc.resolve(None).unwrap();
        assert_eq!(dates.issue_date, date(2026, 10, 17));
        assert_eq!(dates.expiration_date, date(2026, 10, 24));
    }

    #[test]
    fn test_format_for_display_default() {
        let calc = DateCalculator::new(FixedClock::new(date(2026, 1, 1)));
        assert_eq!(calc.format_for_display(date(2026, 2, 8)), "2026-02-08");
    }

    #[test]
    fn test_format_for_display_custom() {
        let calc = DateCalculator::new(FixedClock::new(date(2026, 1, 1)))
            .with_display_format("%m/%d/%Y")
            .unwrap();
        assert_eq!(calc.format_for_display(date(1985, 6, 20)), "06/20/1985");
    }

    #[test]
    fn test_invalid_display_formats() {
        for format in ["", "%Q", "%H:%M"] {
            let result = DateCalculator::system().with_display_format(format);
            assert!(
                matches!(result, Err(DateError::InvalidFormat(_))),
                "format {format:?} should be rejected"
            );
        }
    }
}
