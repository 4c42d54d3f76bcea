//! Player Card - two-page player card generation
//!
//! Fills the `NameField`, `DOBField`, `IssuedDate` and `ExpirationDate`
//! elements of an SVG template, renders it to a PDF page and appends a
//! static second page.
//!
//! # Example
//!
//! ```ignore
//! use card_dates::SystemClock;
//! use player_card::{CardConfig, CardRequest, Pipeline};
//!
//! let pipeline = Pipeline::from_config(CardConfig::default(), SystemClock)?;
//! let request = CardRequest::parse("Jane Smith", "1985-06-20", Some("2026-02-01"))?;
//! let outcome = pipeline.run(&request)?;
//! println!("{outcome}");
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod telemetry;

pub use batch::{run_batch, BatchEntry, BatchReport};
pub use config::{CardConfig, ConfigError};
pub use error::{CardError, ErrorKind, InputError, Result};
pub use pipeline::{output_path_for, slugify_name, CardOutcome, GeneratedCard, Pipeline};
pub use request::CardRequest;
