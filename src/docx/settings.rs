//! Document settings part (`word/settings.xml`).

use super::package::DocxPackage;
use super::xml::{local_part, XmlDocument, XmlElement, XmlNode};
use super::DocxError;

pub const SETTINGS_PART: &str = "word/settings.xml";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const SETTINGS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
const SETTINGS_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

/// `w:settings` children up to the font embedding flags, in schema order.
const SETTINGS_ORDER: &[&str] = &[
    "writeProtection",
    "view",
    "zoom",
    "removePersonalInformation",
    "removeDateAndTime",
    "doNotDisplayPageBoundaries",
    "displayBackgroundShape",
    "printPostScriptOverText",
    "printFractionalCharacterWidth",
    "printFormsData",
    "embedTrueTypeFonts",
    "embedSystemFonts",
    "saveSubsetFonts",
    "saveFormsData",
    "mirrorMargins",
    "alignBordersAndEdges",
    "bordersDoNotSurroundHeader",
    "bordersDoNotSurroundFooter",
    "gutterAtTop",
    "hideSpellingErrors",
    "hideGrammaticalErrors",
    "activeWritingStyle",
    "proofState",
    "formsDesign",
    "attachedTemplate",
    "linkStyles",
    "stylePaneFormatFilter",
    "stylePaneSortMethod",
    "documentType",
    "mailMerge",
    "revisionView",
    "trackRevisions",
    "doNotTrackMoves",
    "doNotTrackFormatting",
    "documentProtection",
    "autoFormatOverride",
    "styleLockTheme",
    "styleLockQFSet",
    "defaultTabStop",
];

pub const FONT_EMBEDDING_FLAGS: [&str; 3] =
    ["w:embedTrueTypeFonts", "w:embedSystemFonts", "w:saveSubsetFonts"];

/// Asks Word to embed the fonts used by the document when it is saved.
///
/// Creates the settings part (with its content type and relationship) when
/// the package has none.
pub fn embed_fonts(package: &mut DocxPackage) -> Result<(), DocxError> {
    if !package.contains(SETTINGS_PART) {
        add_settings_part(package)?;
    }

    let mut settings = package.xml_part(SETTINGS_PART)?;
    for flag in FONT_EMBEDDING_FLAGS {
        settings
            .root
            .ordered_child_mut(flag, SETTINGS_ORDER)
            .set_attr("w:val", "true");
    }
    package.set_xml_part(SETTINGS_PART, &settings)
}

/// Whether every font embedding flag is switched on.
pub fn fonts_embedded(package: &DocxPackage) -> bool {
    let Ok(settings) = package.xml_part(SETTINGS_PART) else {
        return false;
    };
    FONT_EMBEDDING_FLAGS.iter().all(|flag| {
        settings
            .root
            .child(local_part(flag))
            .is_some_and(|element| element.attr("w:val") == Some("true"))
    })
}

fn add_settings_part(package: &mut DocxPackage) -> Result<(), DocxError> {
    let mut content_types = package.xml_part(CONTENT_TYPES_PART)?;
    let mut rels = package.xml_part(DOCUMENT_RELS_PART)?;

    let part_name = format!("/{SETTINGS_PART}");
    let registered = content_types
        .root
        .children_named("Override")
        .any(|o| o.attr("PartName") == Some(part_name.as_str()));
    if !registered {
        content_types.root.children.push(XmlNode::Element(
            XmlElement::new("Override")
                .with_attr("PartName", part_name)
                .with_attr("ContentType", SETTINGS_CONTENT_TYPE),
        ));
        package.set_xml_part(CONTENT_TYPES_PART, &content_types)?;
    }

    let linked = rels
        .root
        .children_named("Relationship")
        .any(|r| r.attr("Type") == Some(SETTINGS_REL_TYPE));
    if !linked {
        let id = next_relationship_id(&rels.root);
        rels.root.children.push(XmlNode::Element(
            XmlElement::new("Relationship")
                .with_attr("Id", id)
                .with_attr("Type", SETTINGS_REL_TYPE)
                .with_attr("Target", "settings.xml"),
        ));
        package.set_xml_part(DOCUMENT_RELS_PART, &rels)?;
    }

    let settings = XmlDocument::new(XmlElement::new("w:settings").with_attr("xmlns:w", WORDML_NS));
    package.set_xml_part(SETTINGS_PART, &settings)
}

fn next_relationship_id(rels: &XmlElement) -> String {
    let highest = rels
        .children_named("Relationship")
        .filter_map(|r| r.attr("Id"))
        .filter_map(|id| id.strip_prefix("rId"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", highest + 1)
}
