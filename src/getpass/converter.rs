//! `.docx` to PDF conversion through an external converter process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to start converter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("converter did not finish within {0:?}")]
    Timeout(Duration),
    #[error("converter exited with status {code}: {stderr}")]
    Exit { code: i32, stderr: String },
    #[error("converter reported success but wrote no PDF at {0}")]
    MissingOutput(PathBuf),
    #[error("converter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders one `.docx` file to a PDF file.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, docx: &Path, pdf: &Path) -> Result<(), ConversionError>;
}

/// Runs `<program> [args..] -f pdf -o <pdf> <docx>`; the unoconv command line.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// Arguments placed before the conversion arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl PdfConverter for CommandConverter {
    async fn convert(&self, docx: &Path, pdf: &Path) -> Result<(), ConversionError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg("-f")
            .arg("pdf")
            .arg("-o")
            .arg(pdf)
            .arg(docx)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConversionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropping the unfinished future drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ConversionError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(ConversionError::Exit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(pdf).await.unwrap_or(false) {
            return Err(ConversionError::MissingOutput(pdf.to_path_buf()));
        }
        Ok(())
    }
}
