//! Getpass generation: business logic for turning a visitor request into a
//! filled, converted and consolidated document.
//!
//! - `dates` - Gregorian to Hijri resolution and Arabic weekday names
//! - `placeholders` - substitution map per date and visitor list
//! - `layout` - run styling rules by text category
//! - `filler` - template filling and styling
//! - `overflow` - visitor list table for more than two visitors
//! - `converter` - external PDF conversion
//! - `merge` - PDF merging and ZIP packaging
//! - `consolidator` - the artifact fallback chain
//! - `service` - the request pipeline

pub mod consolidator;
pub mod converter;
pub mod dates;
pub mod filler;
pub mod handlers;
pub mod layout;
pub mod merge;
pub mod models;
pub mod overflow;
pub mod placeholders;
pub mod service;
pub mod validation;

pub use consolidator::{Artifact, ArtifactKind, Consolidator};
pub use converter::{CommandConverter, ConversionError, PdfConverter};
pub use dates::{DateConverter, HijriCalendar, MissingTimePolicy, ResolvedDate, UmmAlQura};
pub use models::{DateEntry, GetPassRequest, Person};
pub use service::GetpassService;

use std::path::PathBuf;

use thiserror::Error;

use crate::docx::DocxError;

/// Request-level failures.
#[derive(Debug, Error)]
pub enum GetpassError {
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("failed to load template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to generate document {index}: {source}")]
    Generation {
        index: usize,
        #[source]
        source: DocumentError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to generate documents")]
    FatalGenerationFailure,
}

impl GetpassError {
    /// Whether the failure was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDateFormat(_) | Self::InvalidRequest(_))
    }
}

/// Failures while filling one document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Docx(#[from] DocxError),
    #[error("template has no visitor list table")]
    MissingOverflowTable,
    #[error("visitor list table has no rows")]
    EmptyOverflowTable,
    #[error("visitor list row {row} has no cell {cell}")]
    MissingCell { row: usize, cell: usize },
}

/// One filled `.docx`, one per requested date.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// 1-based position in the request's date list.
    pub index: usize,
    pub docx_path: PathBuf,
}
