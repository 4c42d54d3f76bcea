//! Card requests

use crate::error::{InputError, Result};
use card_dates::parse_iso_date;
use chrono::NaiveDate;

/// One card to generate
///
/// Built once from caller input and never changed afterwards. The name is
/// kept verbatim; dates are only checked for format, not for plausibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRequest {
    name: String,
    date_of_birth: NaiveDate,
    issue_date: Option<NaiveDate>,
}

impl CardRequest {
    pub fn new(
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        issue_date: Option<NaiveDate>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InputError::EmptyName.into());
        }
        if let Some(c) = name.chars().find(|c| !is_xml_char(*c)) {
            return Err(InputError::InvalidCharacter(c).into());
        }

        Ok(Self {
            name,
            date_of_birth,
            issue_date,
        })
    }

    /// Build a request from raw text input
    ///
    /// Dates must be `YYYY-MM-DD`. An absent or blank issue date means "today".
    pub fn parse(name: &str, date_of_birth: &str, issue_date: Option<&str>) -> Result<Self> {
        let date_of_birth = parse_iso_date(date_of_birth)?;
        let issue_date = issue_date
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_iso_date)
            .transpose()?;

        Self::new(name, date_of_birth, issue_date)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    /// The requested issue date, if one was given
    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }
}

/// Characters allowed in XML 1.0 character data
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_request() {
        let request = CardRequest::parse("Jane Smith", "1985-06-20", Some("2026-02-01")).unwrap();
        assert_eq!(request.name(), "Jane Smith");
        assert_eq!(
            request.date_of_birth(),
            NaiveDate::from_ymd_opt(1985, 6, 20).unwrap()
        );
        assert_eq!(
            request.issue_date(),
            Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
        );
    }

    #[test]
    fn test_blank_issue_date_means_today() {
        let request = CardRequest::parse("John Doe", "1990-01-15", Some("  ")).unwrap();
        assert_eq!(request.issue_date(), None);
    }

    #[test]
    fn test_bad_dates_are_input_errors() {
        let err = CardRequest::parse("John Doe", "15/01/1990", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);

        let err = CardRequest::parse("John Doe", "1990-01-15", Some("2026-02-30")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = CardRequest::parse("   ", "1990-01-15", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }

    #[test]
    fn test_control_characters_rejected() {
        let err = CardRequest::parse("John\u{1}Doe", "1990-01-15", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert!(matches!(
            err,
            crate::CardError::InputValidation(InputError::InvalidCharacter('\u{1}'))
        ));

        assert!(CardRequest::parse("Bad\u{FFFF}", "1990-01-15", None).is_err());
        assert!(CardRequest::parse("Tab\tSeparated", "1990-01-15", None).is_ok());
    }

    #[test]
    fn test_name_kept_verbatim() {
        let request = CardRequest::parse("  Ünal O'Brien-Smith ", "1990-01-15", None).unwrap();
        assert_eq!(request.name(), "  Ünal O'Brien-Smith ");
    }

    #[test]
    fn test_dob_after_issue_date_is_accepted() {
        let request = CardRequest::parse("Future Kid", "2030-01-01", Some("2026-02-01"));
        assert!(request.is_ok());
    }
}
