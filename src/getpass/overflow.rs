//! Visitor list table, used when there are more visitors than named slots.

use crate::docx::format::{apply_run_format, set_alignment};
use crate::docx::table::{append_row, cell_mut, paragraphs_mut, row_count, row_mut, runs_mut, set_cell_text};
use crate::docx::xml::XmlElement;
use crate::docx::Document;

use super::layout::{overflow_cell_style, RunStyle};
use super::models::Person;
use super::DocumentError;

/// Position of the visitor list among the document's top-level tables.
pub const OVERFLOW_TABLE_INDEX: usize = 1;

/// Writes every visitor into the visitor list, one row each after the header.
///
/// Existing rows are reused before new ones are appended. Cells 0, 1 and 2
/// receive the id number, nationality and name.
pub fn write_visitors(document: &mut Document, people: &[Person]) -> Result<(), DocumentError> {
    let table = document
        .table_mut(OVERFLOW_TABLE_INDEX)
        .ok_or(DocumentError::MissingOverflowTable)?;
    if row_count(table) == 0 {
        return Err(DocumentError::EmptyOverflowTable);
    }

    let style = overflow_cell_style();
    for (i, person) in people.iter().enumerate() {
        let index = i + 1;
        let row = if index < row_count(table) {
            row_mut(table, index)
        } else {
            append_row(table)
        }
        .ok_or(DocumentError::EmptyOverflowTable)?;

        let values = [&person.id_number, &person.nationality, &person.name];
        for (cell_index, value) in values.into_iter().enumerate() {
            let cell = cell_mut(row, cell_index).ok_or(DocumentError::MissingCell {
                row: index,
                cell: cell_index,
            })?;
            write_cell(cell, value.trim(), &style);
        }
    }
    Ok(())
}

fn write_cell(cell: &mut XmlElement, text: &str, style: &RunStyle) {
    set_cell_text(cell, text);
    for paragraph in paragraphs_mut(cell) {
        for run in runs_mut(paragraph) {
            apply_run_format(run, &style.format);
        }
        set_alignment(paragraph, style.alignment);
    }
}
