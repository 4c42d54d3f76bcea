//! PDF Core - Low-level PDF page handling
//!
//! This crate provides functionality for:
//! - Opening PDF documents from files or bytes
//! - Reading page geometry (including inherited MediaBox)
//! - Loading a read-only single-page document ([`StaticPage`])
//! - Composing two single pages into one artifact ([`compose`])
//! - Writing the artifact atomically ([`OutputArtifact::write_atomic`])
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{compose, PdfDocument, StaticPage};
//!
//! let front = PdfDocument::open_from_bytes(&rendered_bytes)?;
//! let back = StaticPage::load("page2.pdf")?;
//! let artifact = compose(&front, &back)?;
//! artifact.write_atomic("outputs/john_doe.pdf")?;
//! ```

mod compose;
mod document;

pub use compose::{compose, OutputArtifact, StaticPage};
pub use document::{PageSize, PdfDocument};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Expected {what} to have exactly one page, found {found}")]
    NotSinglePage { what: &'static str, found: usize },

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inheritable_keys() {
        assert!(INHERITABLE_PAGE_KEYS.contains(&b"MediaBox".as_slice()));
        assert!(INHERITABLE_PAGE_KEYS.contains(&b"Resources".as_slice()));
    }

    #[test]
    fn test_error_messages() {
        let err = PdfError::NotSinglePage {
            what: "static page",
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "Expected static page to have exactly one page, found 3"
        );
        assert_eq!(
            PdfError::InvalidPage(2, 1).to_string(),
            "Invalid page number: 2 (document has 1 pages)"
        );
    }
}
