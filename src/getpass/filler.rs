//! Fills one copy of the getpass template for one date.

use crate::docx::format::{apply_run_format, set_alignment};
use crate::docx::settings::embed_fonts;
use crate::docx::table::{cell_text, cells_mut, paragraphs_mut, rows_mut, run_text, runs_mut, set_cell_text};
use crate::docx::xml::XmlElement;
use crate::docx::Document;
use crate::logging::RequestLog;

use super::dates::ResolvedDate;
use super::layout::StyleRules;
use super::models::Person;
use super::overflow;
use super::placeholders::{self, PlaceholderMap};
use super::DocumentError;

/// Everything one document is filled from.
#[derive(Debug, Clone, Copy)]
pub struct FillJob<'a> {
    pub date: &'a ResolvedDate,
    pub people: &'a [Person],
}

/// Fills the template bytes and returns the edited document, not yet saved.
pub fn fill(template: &[u8], job: &FillJob<'_>, log: &RequestLog) -> Result<Document, DocumentError> {
    let mut document = Document::from_bytes(template)?;
    let resolved = placeholders::resolve(job.date, job.people);
    let rules = StyleRules::new(job.date, job.people);

    for table in document.tables_mut() {
        for row in rows_mut(table) {
            for cell in cells_mut(row) {
                fill_cell(cell, &resolved.map, &rules);
            }
        }
    }

    if resolved.overflow {
        overflow::write_visitors(&mut document, job.people)?;
        log.debug(format!(
            "listed {} visitors in the visitor table",
            job.people.len()
        ));
    }

    if let Err(err) = embed_fonts(document.package_mut()) {
        log.warn(format!("failed to set font embedding: {err}"));
    }

    Ok(document)
}

/// Substitutes tokens in a cell, then restyles every run from its final text.
fn fill_cell(cell: &mut XmlElement, map: &PlaceholderMap, rules: &StyleRules) {
    let text = cell_text(cell);
    let replaced = map.apply(&text);
    if replaced != text {
        set_cell_text(cell, &replaced);
    }

    for paragraph in paragraphs_mut(cell) {
        let mut alignment = None;
        for run in runs_mut(paragraph) {
            let style = rules.style_for(&run_text(run));
            apply_run_format(run, &style.format);
            alignment = Some(style.alignment);
        }
        if let Some(alignment) = alignment {
            set_alignment(paragraph, alignment);
        }
    }
}
