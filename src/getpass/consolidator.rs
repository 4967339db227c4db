//! Turns the generated documents of one request into the single returned file.
//!
//! Conversion and packaging degrade in tiers: merged PDF, single PDF, single
//! `.docx`, then a ZIP of every `.docx`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::logging::RequestLog;

use super::converter::PdfConverter;
use super::merge::{merge_pdf_files, zip_files, MergeError};
use super::{GeneratedDocument, GetpassError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Pdf,
    Docx,
    Zip,
}

impl ArtifactKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Zip => "application/zip",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Zip => "zip",
        }
    }

    /// File name offered to the client.
    pub fn download_name(&self) -> &'static str {
        match self {
            Self::Pdf => "getpass.pdf",
            Self::Docx => "getpass.docx",
            Self::Zip => "getpass_documents.zip",
        }
    }
}

/// The file returned for a request, already in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn download_name(&self) -> &'static str {
        self.kind.download_name()
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

pub struct Consolidator {
    converter: Arc<dyn PdfConverter>,
    output_dir: PathBuf,
}

impl Consolidator {
    pub fn new(converter: Arc<dyn PdfConverter>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            converter,
            output_dir: output_dir.into(),
        }
    }

    /// Converts every document, then packages the best result available.
    ///
    /// `scratch` receives intermediate PDFs; the artifact is written to the
    /// output directory under a name derived from the request id.
    pub async fn consolidate(
        &self,
        documents: &[GeneratedDocument],
        scratch: &Path,
        log: &RequestLog,
    ) -> Result<Artifact, GetpassError> {
        if documents.is_empty() {
            return Err(GetpassError::FatalGenerationFailure);
        }
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let mut pdfs = Vec::with_capacity(documents.len());
        for document in documents {
            let pdf = scratch.join(format!("getpass_{}.pdf", document.index));
            match self.converter.convert(&document.docx_path, &pdf).await {
                Ok(()) => pdfs.push(pdf),
                Err(err) => log.warn(format!(
                    "PDF conversion failed for document {}: {err}",
                    document.index
                )),
            }
        }

        if pdfs.len() == documents.len() {
            match self.package_pdfs(pdfs, log).await {
                Ok(artifact) => return Ok(artifact),
                Err(err) => {
                    log.warn(format!("PDF packaging failed, falling back to Word: {err}"));
                    self.discard(ArtifactKind::Pdf, log).await;
                }
            }
        } else {
            log.info(format!(
                "{} of {} documents converted, falling back to Word",
                pdfs.len(),
                documents.len()
            ));
        }

        match self.package_documents(documents, log).await {
            Ok(artifact) => Ok(artifact),
            Err(err) => {
                log.error(format!("Word fallback failed: {err}"));
                self.discard(ArtifactKind::Docx, log).await;
                self.discard(ArtifactKind::Zip, log).await;
                Err(GetpassError::FatalGenerationFailure)
            }
        }
    }

    /// Removes a partially written artifact.
    async fn discard(&self, kind: ArtifactKind, log: &RequestLog) {
        let path = self.artifact_path(kind, log);
        if tokio::fs::remove_file(&path).await.is_ok() {
            log.debug(format!("removed partial artifact {}", path.display()));
        }
    }

    async fn package_pdfs(&self, pdfs: Vec<PathBuf>, log: &RequestLog) -> Result<Artifact, MergeError> {
        let target = self.artifact_path(ArtifactKind::Pdf, log);
        if pdfs.len() == 1 {
            tokio::fs::copy(&pdfs[0], &target).await?;
        } else {
            let count = pdfs.len();
            let output = target.clone();
            run_blocking(move || merge_pdf_files(&pdfs, &output)).await?;
            log.info(format!("merged {count} PDF documents"));
        }
        Ok(Artifact {
            path: target,
            kind: ArtifactKind::Pdf,
        })
    }

    async fn package_documents(
        &self,
        documents: &[GeneratedDocument],
        log: &RequestLog,
    ) -> Result<Artifact, MergeError> {
        if let [single] = documents {
            let target = self.artifact_path(ArtifactKind::Docx, log);
            tokio::fs::copy(&single.docx_path, &target).await?;
            return Ok(Artifact {
                path: target,
                kind: ArtifactKind::Docx,
            });
        }

        let target = self.artifact_path(ArtifactKind::Zip, log);
        let entries: Vec<(String, PathBuf)> = documents
            .iter()
            .map(|d| (format!("getpass_{}.docx", d.index), d.docx_path.clone()))
            .collect();
        let output = target.clone();
        run_blocking(move || zip_files(&entries, &output)).await?;
        log.info(format!("packaged {} Word documents as ZIP", documents.len()));
        Ok(Artifact {
            path: target,
            kind: ArtifactKind::Zip,
        })
    }

    fn artifact_path(&self, kind: ArtifactKind, log: &RequestLog) -> PathBuf {
        self.output_dir
            .join(format!("getpass_{}.{}", log.request_id(), kind.extension()))
    }
}

async fn run_blocking<F>(task: F) -> Result<(), MergeError>
where
    F: FnOnce() -> Result<(), MergeError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| MergeError::Io(std::io::Error::other(err)))?
}
