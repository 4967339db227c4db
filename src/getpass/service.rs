use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::logging::RequestLog;

use super::consolidator::{Artifact, Consolidator};
use super::converter::{CommandConverter, PdfConverter};
use super::dates::{DateConverter, HijriCalendar, MissingTimePolicy, ResolvedDate, UmmAlQura};
use super::filler::{self, FillJob};
use super::models::{GetPassRequest, Person};
use super::{GeneratedDocument, GetpassError};

/// The getpass pipeline: validate, resolve dates, fill one document per date,
/// then consolidate into a single artifact.
pub struct GetpassService {
    template_path: PathBuf,
    dates: DateConverter<Arc<dyn HijriCalendar>>,
    consolidator: Consolidator,
}

impl GetpassService {
    pub fn new(
        template_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        converter: Arc<dyn PdfConverter>,
        calendar: Arc<dyn HijriCalendar>,
        missing_time: MissingTimePolicy,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            dates: DateConverter::new(calendar, missing_time),
            consolidator: Consolidator::new(converter, output_dir),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let converter =
            CommandConverter::new(config.converter_command.clone(), config.converter_timeout);
        Self::new(
            config.template_path.clone(),
            config.output_dir.clone(),
            Arc::new(converter),
            Arc::new(UmmAlQura),
            config.missing_time,
        )
    }

    pub async fn generate(
        &self,
        request: &GetPassRequest,
        log: &RequestLog,
    ) -> Result<Artifact, GetpassError> {
        request.validate().map_err(GetpassError::InvalidRequest)?;

        // Every date is checked before any document is produced.
        let dates = request
            .dates
            .iter()
            .map(|entry| self.dates.resolve(&entry.date))
            .collect::<Result<Vec<ResolvedDate>, _>>()?;
        log.info(format!(
            "generating {} getpass document(s) for {} visitor(s)",
            dates.len(),
            request.people.len()
        ));

        let template = tokio::fs::read(&self.template_path)
            .await
            .map_err(|source| GetpassError::Template {
                path: self.template_path.clone(),
                source,
            })?;
        let scratch = tempfile::tempdir().map_err(GetpassError::TempDir)?;

        let documents = {
            let people = request.people.clone();
            let scratch_dir = scratch.path().to_path_buf();
            let log = log.clone();
            tokio::task::spawn_blocking(move || {
                fill_documents(&template, &dates, &people, &scratch_dir, &log)
            })
            .await
            .map_err(|err| GetpassError::Io(std::io::Error::other(err)))??
        };

        let artifact = self
            .consolidator
            .consolidate(&documents, scratch.path(), log)
            .await?;
        log.info(format!(
            "returning {} ({})",
            artifact.download_name(),
            artifact.path.display()
        ));
        Ok(artifact)
    }
}

/// Fills and saves one document per date into `scratch`, in date order.
fn fill_documents(
    template: &[u8],
    dates: &[ResolvedDate],
    people: &[Person],
    scratch: &Path,
    log: &RequestLog,
) -> Result<Vec<GeneratedDocument>, GetpassError> {
    let mut documents = Vec::with_capacity(dates.len());
    for (i, date) in dates.iter().enumerate() {
        let index = i + 1;
        let job = FillJob { date, people };
        let docx_path = scratch.join(format!("getpass_{index}.docx"));
        filler::fill(template, &job, log)
            .and_then(|document| document.save(&docx_path).map_err(Into::into))
            .map_err(|source| GetpassError::Generation { index, source })?;
        log.debug(format!(
            "filled document {index} for {}",
            date.gregorian.format("%Y-%m-%d")
        ));
        documents.push(GeneratedDocument { index, docx_path });
    }
    Ok(documents)
}
