use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::core::config::WritePolicy;
use crate::core::error::{AppError, Result};
use crate::features::abuse_analysis::{AbuseAnalyzer, AiAnalysis};
use crate::features::incident_reports::dtos::SubmitReportDto;
use crate::features::incident_reports::models::{IncidentReport, NewIncidentReport};
use crate::features::incident_reports::repository::ReportRepository;

/// Slack on top of the store's own write bound before the caller stops waiting
const WRITE_GUARD_GRACE: Duration = Duration::from_millis(500);

/// What happened to an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The insert completed
    Stored(IncidentReport),
    /// The insert was handed off; its outcome is only logged
    Accepted,
}

/// Validates, optionally analyzes, and stores incoming reports
pub struct IntakeService {
    repository: Arc<dyn ReportRepository>,
    analyzer: Option<Arc<dyn AbuseAnalyzer>>,
    write_policy: WritePolicy,
    write_timeout: Duration,
    analysis_timeout: Duration,
}

impl IntakeService {
    pub fn new(
        repository: Arc<dyn ReportRepository>,
        analyzer: Option<Arc<dyn AbuseAnalyzer>>,
        write_policy: WritePolicy,
        write_timeout: Duration,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            analyzer,
            write_policy,
            write_timeout,
            analysis_timeout,
        }
    }

    /// Submit a report. Nothing is written unless validation passes.
    pub async fn submit(&self, dto: SubmitReportDto) -> Result<SubmissionOutcome> {
        dto.validate()?;

        let analysis = self.analyze(&dto).await;
        let report = NewIncidentReport::from_submission(dto, analysis);

        match self.write_policy {
            WritePolicy::Durable => self.store(report).await.map(SubmissionOutcome::Stored),
            WritePolicy::BestEffort => {
                let repository = Arc::clone(&self.repository);
                tokio::spawn(async move {
                    if let Err(e) = repository.insert(report).await {
                        tracing::error!("Best-effort incident report insert failed: {}", e);
                    }
                });
                Ok(SubmissionOutcome::Accepted)
            }
        }
    }

    /// Durable write. The store enforces `write_timeout` itself; the outer
    /// guard only catches a lost acknowledgement, in which case the report is
    /// looked up by id before the write is declared failed.
    async fn store(&self, report: NewIncidentReport) -> Result<IncidentReport> {
        let id = report.id;
        let guard = self.write_timeout + WRITE_GUARD_GRACE;

        match tokio::time::timeout(guard, self.repository.insert(report)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "No acknowledgement for incident report {} after {:?}, checking the store",
                    id,
                    guard
                );
                match self.repository.find(id).await {
                    Ok(Some(stored)) => {
                        tracing::info!(
                            "Incident report {} was stored despite the late acknowledgement",
                            id
                        );
                        Ok(stored)
                    }
                    Ok(None) => Err(AppError::Persistence(format!(
                        "insert of {} timed out after {:?}",
                        id, guard
                    ))),
                    Err(e) => Err(AppError::Persistence(format!(
                        "insert of {} timed out and could not be confirmed: {}",
                        id, e
                    ))),
                }
            }
        }
    }

    /// Run the analyzer once. Any failure is logged and the report goes
    /// ahead without analysis.
    async fn analyze(&self, dto: &SubmitReportDto) -> Option<AiAnalysis> {
        let analyzer = self.analyzer.as_ref()?;

        match tokio::time::timeout(
            self.analysis_timeout,
            analyzer.analyze(&dto.photo_data_uri, dto.description.trim()),
        )
        .await
        {
            Ok(Ok(analysis)) => Some(analysis),
            Ok(Err(e)) => {
                tracing::warn!("Abuse analysis failed, storing report without it: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Abuse analysis timed out after {:?}, storing report without it",
                    self.analysis_timeout
                );
                None
            }
        }
    }
}
