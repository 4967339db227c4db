//! Paragraph and run formatting.

use super::xml::XmlElement;

/// Schema order of the `w:pPr` children this module touches, plus their
/// neighbours so inserted elements land in a valid position.
const PARAGRAPH_PROPERTY_ORDER: &[&str] = &[
    "pStyle",
    "keepNext",
    "keepLines",
    "pageBreakBefore",
    "framePr",
    "widowControl",
    "numPr",
    "suppressLineNumbers",
    "pBdr",
    "shd",
    "tabs",
    "suppressAutoHyphens",
    "kinsoku",
    "wordWrap",
    "overflowPunct",
    "topLinePunct",
    "autoSpaceDE",
    "autoSpaceDN",
    "bidi",
    "adjustRightInd",
    "snapToGrid",
    "spacing",
    "ind",
    "contextualSpacing",
    "mirrorIndents",
    "suppressOverlap",
    "jc",
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

const RUN_PROPERTY_ORDER: &[&str] = &[
    "rStyle",
    "rFonts",
    "b",
    "bCs",
    "i",
    "iCs",
    "caps",
    "smallCaps",
    "strike",
    "dstrike",
    "outline",
    "shadow",
    "emboss",
    "imprint",
    "noProof",
    "snapToGrid",
    "vanish",
    "webHidden",
    "color",
    "spacing",
    "w",
    "kern",
    "position",
    "sz",
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Center,
    Right,
}

impl Alignment {
    pub fn as_jc(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Run-level character formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunFormat<'a> {
    /// Applied to the ASCII, high-ANSI and complex-script slots.
    pub font: Option<&'a str>,
    pub size_pt: u32,
    pub bold: bool,
}

pub fn set_alignment(paragraph: &mut XmlElement, alignment: Alignment) {
    paragraph
        .leading_child_mut("w:pPr")
        .ordered_child_mut("w:jc", PARAGRAPH_PROPERTY_ORDER)
        .set_attr("w:val", alignment.as_jc());
}

pub fn alignment(paragraph: &XmlElement) -> Option<&str> {
    paragraph.child("pPr")?.child("jc")?.attr("w:val")
}

pub fn apply_run_format(run: &mut XmlElement, format: &RunFormat<'_>) {
    let rpr = run.leading_child_mut("w:rPr");

    if let Some(font) = format.font {
        let fonts = rpr.ordered_child_mut("w:rFonts", RUN_PROPERTY_ORDER);
        fonts.set_attr("w:ascii", font);
        fonts.set_attr("w:hAnsi", font);
        fonts.set_attr("w:cs", font);
    }

    for name in ["w:b", "w:bCs"] {
        let toggle = rpr.ordered_child_mut(name, RUN_PROPERTY_ORDER);
        if format.bold {
            toggle.remove_attr("w:val");
        } else {
            toggle.set_attr("w:val", "0");
        }
    }

    let half_points = (format.size_pt * 2).to_string();
    for name in ["w:sz", "w:szCs"] {
        rpr.ordered_child_mut(name, RUN_PROPERTY_ORDER)
            .set_attr("w:val", half_points.as_str());
    }
}

/// Reads back the formatting of a run; `None` fields were never set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppliedFormat {
    pub font: Option<String>,
    pub size_pt: Option<u32>,
    pub bold: Option<bool>,
}

pub fn run_format(run: &XmlElement) -> AppliedFormat {
    let Some(rpr) = run.child("rPr") else {
        return AppliedFormat::default();
    };
    AppliedFormat {
        font: rpr
            .child("rFonts")
            .and_then(|fonts| fonts.attr("w:ascii"))
            .map(str::to_string),
        size_pt: rpr
            .child("sz")
            .and_then(|sz| sz.attr("w:val"))
            .and_then(|val| val.parse::<u32>().ok())
            .map(|half_points| half_points / 2),
        bold: rpr
            .child("b")
            .map(|b| !matches!(b.attr("w:val"), Some("0" | "false" | "off"))),
    }
}
