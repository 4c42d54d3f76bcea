//! Generator configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid date_format: {0}")]
    DateFormat(#[from] card_dates::DateError),
}

/// Paths, fonts and formatting used by the pipeline
///
/// Every key is optional in the JSON file; missing keys take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    /// SVG template for page 1
    pub template_path: PathBuf,
    /// Pre-built page 2
    pub static_page_path: PathBuf,
    /// Where generated cards go when no explicit path is given
    pub output_dir: PathBuf,
    /// Bundled fonts, loaded when the directory exists
    pub fonts_dir: Option<PathBuf>,
    pub load_system_fonts: bool,
    pub default_font_family: String,
    /// strftime pattern for every date shown on the card
    pub date_format: String,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("page1.svg"),
            static_page_path: PathBuf::from("page2.pdf"),
            output_dir: PathBuf::from("outputs"),
            fonts_dir: Some(PathBuf::from("fonts")),
            load_system_fonts: true,
            default_font_family: "DejaVu Sans".to_string(),
            date_format: card_dates::DEFAULT_DISPLAY_FORMAT.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl CardConfig {
    /// Load and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the given file when there is one
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        card_dates::validate_display_format(&self.date_format)?;
        Ok(())
    }
}
