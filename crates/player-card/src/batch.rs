//! Batch generation from a YAML player list

use crate::error::{InputError, Result};
use crate::pipeline::{CardOutcome, Pipeline};
use crate::request::CardRequest;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;
use tracing::{info, warn};

/// One entry of the player list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
}

impl BatchEntry {
    /// The request this entry describes, or `None` when name or dob is missing
    fn request(&self) -> Option<Result<CardRequest>> {
        let name = self.name.as_deref().filter(|n| !n.trim().is_empty())?;
        let dob = self.dob.as_deref().filter(|d| !d.trim().is_empty())?;
        Some(CardRequest::parse(name, dob, self.issue_date.as_deref()))
    }
}

/// What a batch run produced
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub generated: Vec<CardOutcome>,
    /// Entries without a name or date of birth
    pub skipped: usize,
}

impl BatchReport {
    /// Total number of entries seen
    pub fn total(&self) -> usize {
        self.generated.len() + self.skipped
    }
}

/// Parse a YAML document holding a list of player entries
///
/// The top level must be a sequence. Entries that are not mappings, or whose
/// fields have the wrong type, are kept as empty entries so they get skipped.
pub fn parse_entries(source: &str, yaml: &str) -> Result<Vec<BatchEntry>> {
    let document: Value = serde_yaml::from_str(yaml).map_err(|e| InputError::Batch {
        path: source.to_string(),
        reason: e.to_string(),
    })?;

    let Value::Sequence(items) = document else {
        return Err(InputError::Batch {
            path: source.to_string(),
            reason: "must contain a list of player entries".to_string(),
        }
        .into());
    };

    Ok(items
        .into_iter()
        .map(|item| {
            serde_yaml::from_value(item.clone()).unwrap_or_else(|e| {
                warn!(entry = ?item, error = %e, "unreadable batch entry");
                BatchEntry::default()
            })
        })
        .collect())
}

/// Generate every entry of a YAML player list
///
/// Incomplete entries are skipped with a warning. The first entry that fails
/// in the pipeline stops the batch and its error is returned as is.
pub fn run_batch<P: AsRef<Path>>(pipeline: &Pipeline, path: P) -> Result<BatchReport> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|e| InputError::Batch {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let entries = parse_entries(&path.display().to_string(), &yaml)?;
    info!(file = %path.display(), entries = entries.len(), "processing batch");

    let mut report = BatchReport::default();
    for entry in &entries {
        match entry.request() {
            None => {
                warn!(entry = ?entry, "skipping entry with missing name or dob");
                report.skipped += 1;
            }
            Some(request) => {
                let outcome = pipeline.run(&request?)?;
                report.generated.push(outcome);
            }
        }
    }

    info!(
        generated = report.generated.len(),
        skipped = report.skipped,
        "batch complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_entries() {
        let yaml = r#"
- name: John Doe
  dob: 1990-01-15
- name: Jane Smith
  dob: "1985-06-20"
  issue_date: 2026-02-01
- name: No Birthday
"#;
        let entries = parse_entries("players.yaml", yaml).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].dob.as_deref(), Some("1990-01-15"));
        assert_eq!(entries[1].issue_date.as_deref(), Some("2026-02-01"));
        assert!(entries[2].request().is_none());
    }

    #[test]
    fn test_top_level_must_be_a_list() {
        let err = parse_entries("players.yaml", "name: John Doe\ndob: 1990-01-15\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }

    #[test]
    fn test_non_mapping_entry_is_skipped() {
        let entries = parse_entries("players.yaml", "- just a string\n- 42\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.request().is_none()));
    }

    #[test]
    fn test_blank_fields_are_missing() {
        let entry = BatchEntry {
            name: Some("  ".to_string()),
            dob: Some("1990-01-15".to_string()),
            issue_date: None,
        };
        assert!(entry.request().is_none());
    }

    #[test]
    fn test_invalid_date_is_not_skipped() {
        let entry = BatchEntry {
            name: Some("John Doe".to_string()),
            dob: Some("15.01.1990".to_string()),
            issue_date: None,
        };
        let err = entry.request().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }
}
