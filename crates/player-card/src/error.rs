//! Pipeline failure taxonomy

use card_dates::DateError;
use pdf_core::PdfError;
use std::fmt;
use template::TemplateError;
use thiserror::Error;

/// Why a request was rejected before any document was touched
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Date(#[from] DateError),

    #[error("name must not be empty")]
    EmptyName,

    #[error("name contains a character that cannot appear on the card: {0:?}")]
    InvalidCharacter(char),

    #[error("batch input {path}: {reason}")]
    Batch { path: String, reason: String },
}

/// A failed card generation, classified by the step that failed
#[derive(Debug, Error)]
pub enum CardError {
    #[error("invalid input")]
    InputValidation(#[source] InputError),

    #[error("template structure error")]
    TemplateStructure(#[source] TemplateError),

    #[error("render failed")]
    Render(#[source] TemplateError),

    #[error("composition failed")]
    Composition(#[source] PdfError),
}

/// The four failure kinds, without their payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InputValidation,
    TemplateStructure,
    Render,
    Composition,
}

impl CardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CardError::InputValidation(_) => ErrorKind::InputValidation,
            CardError::TemplateStructure(_) => ErrorKind::TemplateStructure,
            CardError::Render(_) => ErrorKind::Render,
            CardError::Composition(_) => ErrorKind::Composition,
        }
    }
}

impl From<InputError> for CardError {
    fn from(err: InputError) -> Self {
        CardError::InputValidation(err)
    }
}

impl From<DateError> for CardError {
    fn from(err: DateError) -> Self {
        CardError::InputValidation(InputError::Date(err))
    }
}

impl From<PdfError> for CardError {
    fn from(err: PdfError) -> Self {
        CardError::Composition(err)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InputValidation => "InputValidationError",
            ErrorKind::TemplateStructure => "TemplateStructureError",
            ErrorKind::Render => "RenderError",
            ErrorKind::Composition => "CompositionError",
        };
        f.write_str(name)
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, CardError>;
