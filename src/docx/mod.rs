//! WordprocessingML (`.docx`) editing.
//!
//! Just enough of the format to fill a table-based template:
//! - `package` - zip container I/O
//! - `xml` - mutable element tree over quick-xml
//! - `document` - main document part and its tables
//! - `table` - row, cell, paragraph and run access
//! - `format` - paragraph alignment and run formatting
//! - `settings` - settings part edits (font embedding)

pub mod document;
pub mod format;
pub mod package;
pub mod settings;
pub mod table;
pub mod xml;

pub use document::Document;
pub use format::{Alignment, RunFormat};
pub use package::DocxPackage;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("invalid docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("docx I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed XML in {part}: {message}")]
    Xml { part: String, message: String },
    #[error("docx package has no part named {0}")]
    MissingPart(String),
}
