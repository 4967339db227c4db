#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use getpass_server::getpass::{
    ConversionError, DateEntry, GetPassRequest, GetpassService, MissingTimePolicy, PdfConverter,
    Person, UmmAlQura,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

fn cell(text: &str) -> String {
    format!(
        r#"<w:tc><w:tcPr><w:tcW w:w="2400" w:type="dxa"/></w:tcPr><w:p><w:pPr><w:bidi/></w:pPr><w:r><w:rPr><w:rtl/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r></w:p></w:tc>"#
    )
}

fn row(cells: &[&str]) -> String {
    let cells: String = cells.iter().map(|text| cell(text)).collect();
    format!("<w:tr>{cells}</w:tr>")
}

/// Getpass form layout: the form table, then the visitor list with a header
/// and `list_rows` empty rows.
pub fn template_docx(list_rows: usize) -> Vec<u8> {
    let form = [
        row(&["تصريح دخول زوار", "(اليوم)"]),
        row(&["[D]", "[M]", "[Y]"]),
        row(&["[d]", "[m]", "[yyyy]"]),
        row(&["الموضح هوياتهم بالبيان المرفق وعددهم (ع)"]),
        row(&["(الزائر1)", "(الهويه1)", "(الجنسيه1)"]),
        row(&["(الزائر2)", "(الهويه2)", "(الجنسيه2)"]),
        row(&["من (اولهم) إلى (اخرهم)"]),
    ]
    .concat();

    let mut list = row(&["رقم الهوية", "الجنسية", "الاسم"]);
    for _ in 0..list_rows {
        list.push_str(&row(&["", "", ""]));
    }

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:tbl><w:tblPr><w:bidiVisual/></w:tblPr>{form}</w:tbl><w:p/><w:tbl><w:tblPr><w:bidiVisual/></w:tblPr>{list}</w:tbl><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A one-page PDF with `text` on it.
pub fn one_page_pdf(text: &str) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 760.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Renders each document as a one-page PDF naming its source file.
pub struct FakePdfConverter;

#[async_trait]
impl PdfConverter for FakePdfConverter {
    async fn convert(&self, docx: &Path, pdf: &Path) -> Result<(), ConversionError> {
        // The input must be a readable package.
        getpass_server::docx::Document::open(docx).map_err(|e| ConversionError::Exit {
            code: 2,
            stderr: e.to_string(),
        })?;
        let name = docx
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        one_page_pdf(&format!("rendered {name}"))
            .save(pdf)
            .map_err(|e| ConversionError::Io(std::io::Error::other(e.to_string())))?;
        Ok(())
    }
}

pub struct FailingPdfConverter;

#[async_trait]
impl PdfConverter for FailingPdfConverter {
    async fn convert(&self, _docx: &Path, _pdf: &Path) -> Result<(), ConversionError> {
        Err(ConversionError::Timeout(Duration::from_secs(120)))
    }
}

/// A service over a template and output directory in a private temp dir.
pub struct TestEnv {
    pub dir: TempDir,
    pub service: GetpassService,
}

impl TestEnv {
    pub fn new(converter: Arc<dyn PdfConverter>) -> Self {
        Self::with_template(converter, &template_docx(2))
    }

    pub fn with_template(converter: Arc<dyn PdfConverter>, template: &[u8]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("GETPASS.docx");
        std::fs::write(&template_path, template).unwrap();
        let service = GetpassService::new(
            template_path,
            dir.path().join("output"),
            converter,
            Arc::new(UmmAlQura),
            MissingTimePolicy::Midday,
        );
        Self { dir, service }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn output_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.output_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub fn people(n: usize) -> Vec<Person> {
    (1..=n)
        .map(|i| Person {
            name: format!("زائر رقم {i}"),
            nationality: "سعودي".to_string(),
            id_number: format!("10000000{i:02}"),
        })
        .collect()
}

pub fn request(people_count: usize, dates: &[&str]) -> GetPassRequest {
    GetPassRequest {
        people: people(people_count),
        dates: dates
            .iter()
            .map(|date| DateEntry {
                date: date.to_string(),
            })
            .collect(),
    }
}
