//! Table, row, cell and run access over `w:tbl` elements.

use super::xml::{XmlElement, XmlNode};

pub fn rows(table: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    table.children_named("tr")
}

pub fn rows_mut(table: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    table.children_named_mut("tr")
}

pub fn row_count(table: &XmlElement) -> usize {
    rows(table).count()
}

pub fn row_mut(table: &mut XmlElement, index: usize) -> Option<&mut XmlElement> {
    rows_mut(table).nth(index)
}

pub fn cells(row: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    row.children_named("tc")
}

pub fn cells_mut(row: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    row.children_named_mut("tc")
}

pub fn cell_mut(row: &mut XmlElement, index: usize) -> Option<&mut XmlElement> {
    cells_mut(row).nth(index)
}

pub fn paragraphs(cell: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    cell.children_named("p")
}

pub fn paragraphs_mut(cell: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    cell.children_named_mut("p")
}

/// Runs that sit directly in the paragraph.
pub fn runs(paragraph: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    paragraph.children_named("r")
}

pub fn runs_mut(paragraph: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    paragraph.children_named_mut("r")
}

/// Visible text of a run: `w:t` content, tabs as `\t`, breaks as `\n`.
pub fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.local_name() {
            "t" => text.push_str(&child.text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Paragraph text, including runs nested in hyperlinks.
pub fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut text = String::new();
    for child in paragraph.elements() {
        match child.local_name() {
            "r" => text.push_str(&run_text(child)),
            "hyperlink" => runs(child).for_each(|run| text.push_str(&run_text(run))),
            _ => {}
        }
    }
    text
}

/// Cell text: paragraph texts joined by newlines.
pub fn cell_text(cell: &XmlElement) -> String {
    paragraphs(cell)
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces the cell content with one paragraph holding one run of `text`.
///
/// Cell properties survive; every other child, with its formatting, is dropped.
pub fn set_cell_text(cell: &mut XmlElement, text: &str) {
    cell.children.retain(|node| match node {
        XmlNode::Element(element) => element.is("tcPr"),
        _ => false,
    });
    cell.children.push(XmlNode::Element(
        XmlElement::new("w:p").with_child(text_run(text)),
    ));
}

/// Builds a `w:r` for `text`, mapping `\t` and `\n` to tab and break elements.
pub fn text_run(text: &str) -> XmlElement {
    let mut run = XmlElement::new("w:r");
    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                push_text(&mut run, &mut segment);
                let name = if ch == '\t' { "w:tab" } else { "w:br" };
                run.children.push(XmlNode::Element(XmlElement::new(name)));
            }
            _ => segment.push(ch),
        }
    }
    push_text(&mut run, &mut segment);
    run
}

fn push_text(run: &mut XmlElement, segment: &mut String) {
    if segment.is_empty() && !run.children.is_empty() {
        return;
    }
    let mut t = XmlElement::new("w:t");
    if segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    if !segment.is_empty() {
        t.children.push(XmlNode::Text(std::mem::take(segment)));
    }
    run.children.push(XmlNode::Element(t));
}

/// Appends a row shaped like the last one: same row and cell properties,
/// each cell holding a single empty paragraph. Returns `None` for a table
/// without rows.
pub fn append_row(table: &mut XmlElement) -> Option<&mut XmlElement> {
    let mut row = rows(table).last()?.clone();
    for cell in cells_mut(&mut row) {
        cell.children.retain(|node| match node {
            XmlNode::Element(element) => element.is("tcPr"),
            _ => false,
        });
        cell.children
            .push(XmlNode::Element(XmlElement::new("w:p")));
    }

    let index = table
        .children
        .iter()
        .rposition(|node| matches!(node, XmlNode::Element(element) if element.is("tr")))
        .map_or(table.children.len(), |last| last + 1);
    table.children.insert(index, XmlNode::Element(row));
    match &mut table.children[index] {
        XmlNode::Element(row) => Some(row),
        _ => None,
    }
}
