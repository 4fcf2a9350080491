//! Fixtures and stub collaborators shared by the unit and HTTP tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::FixedOffset;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::config::WritePolicy;
use crate::core::error::{AppError, Result};
use crate::features::abuse_analysis::{AbuseAnalyzer, AiAnalysis};
use crate::features::incident_reports::dtos::SubmitReportDto;
use crate::features::incident_reports::models::{IncidentReport, NewIncidentReport, ReportChange};
use crate::features::incident_reports::repository::{InMemoryReportRepository, ReportRepository};
use crate::features::incident_reports::services::{IntakeService, ListingService};
use crate::features::incident_reports::{self, ReportState};

/// 1x1 transparent PNG
pub const PHOTO_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn submission(description: &str) -> SubmitReportDto {
    SubmitReportDto {
        description: description.to_string(),
        location: None,
        reporter_name: None,
        reporter_contact: None,
        photo_data_uri: PHOTO_DATA_URI.to_string(),
    }
}

pub fn new_report(description: &str) -> NewIncidentReport {
    NewIncidentReport::from_submission(submission(description), None)
}

/// Brasília time
pub fn display_offset() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap()
}

/// Report routes over the given collaborators, with short timeouts
pub fn report_router(
    repository: Arc<dyn ReportRepository>,
    analyzer: Option<Arc<dyn AbuseAnalyzer>>,
    write_policy: WritePolicy,
) -> Router {
    let state = ReportState {
        intake: Arc::new(IntakeService::new(
            repository.clone(),
            analyzer,
            write_policy,
            Duration::from_millis(500),
            Duration::from_millis(500),
        )),
        listing: Arc::new(ListingService::new(repository, display_offset())),
    };
    incident_reports::routes::routes(state)
}

/// Every write and read fails
pub struct FailingRepository;

#[async_trait]
impl ReportRepository for FailingRepository {
    async fn insert(&self, _report: NewIncidentReport) -> Result<IncidentReport> {
        Err(AppError::Persistence("connection refused".to_string()))
    }

    async fn list_recent(&self) -> Result<Vec<IncidentReport>> {
        Err(AppError::Subscription("connection refused".to_string()))
    }

    async fn find(&self, _id: Uuid) -> Result<Option<IncidentReport>> {
        Err(AppError::Subscription("connection refused".to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<ReportChange> {
        broadcast::channel(1).1
    }
}

/// Writes never complete
pub struct PendingRepository;

#[async_trait]
impl ReportRepository for PendingRepository {
    async fn insert(&self, _report: NewIncidentReport) -> Result<IncidentReport> {
        std::future::pending().await
    }

    async fn list_recent(&self) -> Result<Vec<IncidentReport>> {
        Ok(Vec::new())
    }

    async fn find(&self, _id: Uuid) -> Result<Option<IncidentReport>> {
        Ok(None)
    }

    fn subscribe(&self) -> broadcast::Receiver<ReportChange> {
        broadcast::channel(1).1
    }
}

/// Commits the write, then never acknowledges it
#[derive(Default)]
pub struct LateAckRepository {
    inner: InMemoryReportRepository,
}

#[async_trait]
impl ReportRepository for LateAckRepository {
    async fn insert(&self, report: NewIncidentReport) -> Result<IncidentReport> {
        self.inner.insert(report).await?;
        std::future::pending().await
    }

    async fn list_recent(&self) -> Result<Vec<IncidentReport>> {
        self.inner.list_recent().await
    }

    async fn find(&self, id: Uuid) -> Result<Option<IncidentReport>> {
        self.inner.find(id).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ReportChange> {
        self.inner.subscribe()
    }
}

pub struct FixedAnalyzer;

impl FixedAnalyzer {
    pub fn analysis() -> AiAnalysis {
        AiAnalysis {
            abuse_estimate: "alto: sinais de desnutrição".to_string(),
            resources: "Acione a ONG de proteção animal local.".to_string(),
        }
    }
}

#[async_trait]
impl AbuseAnalyzer for FixedAnalyzer {
    async fn analyze(&self, _photo_data_uri: &str, _description: &str) -> Result<AiAnalysis> {
        Ok(Self::analysis())
    }
}

pub struct FailingAnalyzer;

#[async_trait]
impl AbuseAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _photo_data_uri: &str, _description: &str) -> Result<AiAnalysis> {
        Err(AppError::Analysis("model unavailable".to_string()))
    }
}

/// Never answers, so callers hit their timeout
pub struct PendingAnalyzer;

#[async_trait]
impl AbuseAnalyzer for PendingAnalyzer {
    async fn analyze(&self, _photo_data_uri: &str, _description: &str) -> Result<AiAnalysis> {
        std::future::pending().await
    }
}
