//! Run styling by text category.
//!
//! After substitution every run is restyled from its final text alone: the
//! count label, a date component, a visitor value, or anything else.

use std::collections::HashSet;

use crate::docx::{Alignment, RunFormat};

use super::dates::ResolvedDate;
use super::models::Person;

/// Fragment that identifies the visitor count label.
pub const COUNT_LABEL_FRAGMENT: &str = "لموضح هوياتهم بالبيان";
pub const HEADING_FONT: &str = "Times New Roman (Headings CS)";
pub const BODY_FONT: &str = "Arial (Body CS)";

const DATE_SIZE_PT: u32 = 8;
const TEXT_SIZE_PT: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCategory {
    CountLabel,
    Date(DatePart),
    /// A visitor name, nationality or id number, or the weekday name.
    Visitor,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStyle {
    pub format: RunFormat<'static>,
    /// Applied to the paragraph holding the run.
    pub alignment: Alignment,
}

impl TextCategory {
    pub fn style(&self) -> RunStyle {
        match self {
            Self::CountLabel => RunStyle {
                format: RunFormat {
                    font: Some(HEADING_FONT),
                    size_pt: TEXT_SIZE_PT,
                    bold: false,
                },
                alignment: Alignment::Right,
            },
            Self::Date(part) => RunStyle {
                format: RunFormat {
                    font: Some(BODY_FONT),
                    size_pt: DATE_SIZE_PT,
                    bold: true,
                },
                alignment: match part {
                    DatePart::Day | DatePart::Month => Alignment::Center,
                    DatePart::Year => Alignment::Right,
                },
            },
            Self::Visitor => RunStyle {
                format: RunFormat {
                    font: None,
                    size_pt: TEXT_SIZE_PT,
                    bold: true,
                },
                alignment: Alignment::Right,
            },
            Self::Other => RunStyle {
                format: RunFormat {
                    font: Some(HEADING_FONT),
                    size_pt: TEXT_SIZE_PT,
                    bold: true,
                },
                alignment: Alignment::Right,
            },
        }
    }
}

/// Style of every cell written into the visitor list table.
pub fn overflow_cell_style() -> RunStyle {
    RunStyle {
        format: RunFormat {
            font: Some(BODY_FONT),
            size_pt: TEXT_SIZE_PT,
            bold: true,
        },
        alignment: Alignment::Center,
    }
}

/// Category sets for one document.
#[derive(Debug, Clone)]
pub struct StyleRules {
    /// Checked in order, so a value that is both a day and a month is a day.
    date_values: Vec<(String, DatePart)>,
    visitor_values: HashSet<String>,
}

impl StyleRules {
    pub fn new(date: &ResolvedDate, people: &[Person]) -> Self {
        let date_values = vec![
            (date.hijri_day.clone(), DatePart::Day),
            (date.gregorian_day.clone(), DatePart::Day),
            (date.hijri_month.clone(), DatePart::Month),
            (date.gregorian_month.clone(), DatePart::Month),
            (date.hijri_year.clone(), DatePart::Year),
            (date.gregorian_year.clone(), DatePart::Year),
        ];

        let mut visitor_values: HashSet<String> = people
            .iter()
            .flat_map(|p| [p.name.clone(), p.nationality.clone(), p.id_number.clone()])
            .collect();
        visitor_values.insert(date.weekday_name.clone());

        Self {
            date_values,
            visitor_values,
        }
    }

    /// Classifies run text; surrounding whitespace is ignored.
    pub fn classify(&self, text: &str) -> TextCategory {
        let text = text.trim();
        if text.contains(COUNT_LABEL_FRAGMENT) {
            return TextCategory::CountLabel;
        }
        if let Some((_, part)) = self.date_values.iter().find(|(value, _)| value == text) {
            return TextCategory::Date(*part);
        }
        if self.visitor_values.contains(text) {
            return TextCategory::Visitor;
        }
        TextCategory::Other
    }

    pub fn style_for(&self, text: &str) -> RunStyle {
        self.classify(text).style()
    }
}
