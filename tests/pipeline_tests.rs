mod common;

use std::io::Read;
use std::sync::Arc;

use common::{request, template_docx, FailingPdfConverter, FakePdfConverter, TestEnv};
use getpass_server::docx::format::run_format;
use getpass_server::docx::settings::fonts_embedded;
use getpass_server::docx::table::{cell_text, cells, paragraphs, rows, runs};
use getpass_server::docx::Document;
use getpass_server::getpass::{ArtifactKind, GetpassError};
use getpass_server::logging::RequestLog;

fn table_texts(document: &Document, index: usize) -> Vec<Vec<String>> {
    let tables = document.tables();
    rows(tables[index])
        .map(|row| cells(row).map(cell_text).collect())
        .collect()
}

#[tokio::test]
async fn test_single_date_returns_single_pdf() {
    let env = TestEnv::new(Arc::new(FakePdfConverter));
    let artifact = env
        .service
        .generate(&request(1, &["2024-01-01T10:00:00Z"]), &RequestLog::new())
        .await
        .unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Pdf);
    assert_eq!(artifact.download_name(), "getpass.pdf");
    assert!(artifact.path.starts_with(env.output_dir()));
    let pdf = lopdf::Document::load(&artifact.path).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
}

#[tokio::test]
async fn test_several_dates_are_merged_in_order() {
    let env = TestEnv::new(Arc::new(FakePdfConverter));
    let artifact = env
        .service
        .generate(
            &request(2, &["2024-01-01", "2024-01-02", "2024-01-03"]),
            &RequestLog::new(),
        )
        .await
        .unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Pdf);
    let pdf = lopdf::Document::load(&artifact.path).unwrap();
    let pages: Vec<lopdf::ObjectId> = pdf.get_pages().values().copied().collect();
    assert_eq!(pages.len(), 3);

    for (i, page) in pages.iter().enumerate() {
        let content = String::from_utf8_lossy(&pdf.get_page_content(*page).unwrap()).into_owned();
        assert!(
            content.contains(&format!("getpass_{}.docx", i + 1)),
            "page {} has {content:?}",
            i + 1
        );
    }
}

#[tokio::test]
async fn test_failed_conversion_of_one_document_returns_docx() {
    let env = TestEnv::new(Arc::new(FailingPdfConverter));
    let artifact = env
        .service
        .generate(&request(2, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Docx);
    assert_eq!(artifact.download_name(), "getpass.docx");

    let document = Document::open(&artifact.path).unwrap();
    let form = table_texts(&document, 0);
    assert_eq!(form[0], vec!["تصريح دخول زوار", "الإثنين"]);
    assert_eq!(form[1], vec!["19", "06", "1445"]);
    assert_eq!(form[2], vec!["01", "01", "2024"]);
    assert_eq!(
        form[3],
        vec!["الموضح هوياتهم بالبيان المرفق وعددهم (02) ☒"]
    );
    assert_eq!(form[4], vec!["زائر رقم 1", "1000000001", "سعودي"]);
    assert_eq!(form[5], vec!["زائر رقم 2", "1000000002", "سعودي"]);
    assert!(fonts_embedded(document.package()));
}

#[tokio::test]
async fn test_failed_conversion_of_several_documents_returns_zip() {
    let env = TestEnv::new(Arc::new(FailingPdfConverter));
    let artifact = env
        .service
        .generate(
            &request(1, &["2024-01-01", "2024-01-02", "2024-01-03"]),
            &RequestLog::new(),
        )
        .await
        .unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Zip);
    assert_eq!(artifact.download_name(), "getpass_documents.zip");

    let file = std::fs::File::open(&artifact.path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["getpass_1.docx", "getpass_2.docx", "getpass_3.docx"]
    );

    // Each entry is its own date.
    let mut bytes = Vec::new();
    archive
        .by_name("getpass_3.docx")
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    let third = Document::from_bytes(&bytes).unwrap();
    assert_eq!(table_texts(&third, 0)[2], vec!["03", "01", "2024"]);
}

#[tokio::test]
async fn test_more_than_two_visitors_use_visitor_table() {
    let env = TestEnv::new(Arc::new(FailingPdfConverter));
    let artifact = env
        .service
        .generate(&request(5, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap();
    let document = Document::open(&artifact.path).unwrap();

    let form = table_texts(&document, 0);
    assert_eq!(
        form[3],
        vec!["الموضح هوياتهم بالبيان المرفق وعددهم (05) ☒"]
    );
    assert_eq!(form[4], vec!["", "", ""]);
    assert_eq!(form[5], vec!["", "", ""]);
    assert_eq!(form[6], vec!["من زائر رقم 1 إلى زائر رقم 5"]);

    // Header, two template rows reused, three appended.
    let list = table_texts(&document, 1);
    assert_eq!(list.len(), 6);
    assert_eq!(list[0], vec!["رقم الهوية", "الجنسية", "الاسم"]);
    for (i, row) in list.iter().skip(1).enumerate() {
        let n = i + 1;
        assert_eq!(
            row,
            &vec![
                format!("10000000{n:02}"),
                "سعودي".to_string(),
                format!("زائر رقم {n}"),
            ]
        );
    }

    let tables = document.tables();
    let last_row = rows(tables[1]).last().unwrap();
    for cell in cells(last_row) {
        for paragraph in paragraphs(cell) {
            for run in runs(paragraph) {
                let format = run_format(run);
                assert_eq!(format.font.as_deref(), Some("Arial (Body CS)"));
                assert_eq!(format.size_pt, Some(15));
                assert_eq!(format.bold, Some(true));
            }
        }
    }
}

#[tokio::test]
async fn test_invalid_date_fails_before_any_output() {
    let env = TestEnv::new(Arc::new(FakePdfConverter));
    let err = env
        .service
        .generate(&request(1, &["2024-01-01", "not-a-date"]), &RequestLog::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GetpassError::InvalidDateFormat(_)));
    assert!(err.is_client_error());
    assert!(env.output_files().is_empty());
}

#[tokio::test]
async fn test_empty_lists_are_rejected() {
    let env = TestEnv::new(Arc::new(FakePdfConverter));

    let err = env
        .service
        .generate(&request(0, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GetpassError::InvalidRequest(_)));

    let err = env
        .service
        .generate(&request(1, &[]), &RequestLog::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GetpassError::InvalidRequest(_)));
    assert!(env.output_files().is_empty());
}

#[tokio::test]
async fn test_missing_template_is_a_server_error() {
    let env = TestEnv::new(Arc::new(FakePdfConverter));
    std::fs::remove_file(env.dir.path().join("GETPASS.docx")).unwrap();

    let err = env
        .service
        .generate(&request(1, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GetpassError::Template { .. }));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_template_without_visitor_table_fails_only_for_long_lists() {
    let template = {
        let full = Document::from_bytes(&template_docx(2)).unwrap();
        // Drop the second table by rebuilding from a one-table body.
        let xml = String::from_utf8(
            full.package()
                .part(getpass_server::docx::document::DOCUMENT_PART)
                .unwrap()
                .to_vec(),
        )
        .unwrap();
        let start = xml.rfind("<w:tbl>").unwrap();
        let end = xml.rfind("</w:tbl>").unwrap() + "</w:tbl>".len();
        let trimmed = format!("{}{}", &xml[..start], &xml[end..]);
        let mut package = full.package().clone();
        package.set_part(
            getpass_server::docx::document::DOCUMENT_PART,
            trimmed.into_bytes(),
        );
        package.to_bytes().unwrap()
    };

    let env = TestEnv::with_template(Arc::new(FailingPdfConverter), &template);
    env.service
        .generate(&request(2, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap();

    let err = env
        .service
        .generate(&request(3, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GetpassError::Generation { index: 1, .. }));
}

#[tokio::test]
async fn test_each_request_gets_its_own_output_file() {
    let env = TestEnv::new(Arc::new(FakePdfConverter));
    let first = env
        .service
        .generate(&request(1, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap();
    let second = env
        .service
        .generate(&request(1, &["2024-01-01"]), &RequestLog::new())
        .await
        .unwrap();

    assert_ne!(first.path, second.path);
    assert!(first.path.exists());
    assert!(second.path.exists());
}
