use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{ReportRepository, CHANGE_CHANNEL_CAPACITY};
use crate::core::error::{AppError, Result};
use crate::features::incident_reports::models::{IncidentReport, NewIncidentReport, ReportChange};

/// Process-local report store. Contents are lost on restart.
pub struct InMemoryReportRepository {
    reports: RwLock<Vec<IncidentReport>>,
    changes: broadcast::Sender<ReportChange>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            reports: RwLock::new(Vec::new()),
            changes,
        }
    }

    /// Write timestamps never go backwards, even if the wall clock does.
    fn next_report_date(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = Utc::now();
        match last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        }
    }
}

impl Default for InMemoryReportRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn insert(&self, report: NewIncidentReport) -> Result<IncidentReport> {
        let stored = {
            let mut reports = self
                .reports
                .write()
                .map_err(|e| AppError::Persistence(format!("report store lock poisoned: {}", e)))?;

            if reports.iter().any(|r| r.id == report.id) {
                return Err(AppError::Persistence(format!(
                    "incident report {} already stored",
                    report.id
                )));
            }

            let stored = IncidentReport {
                id: report.id,
                description: report.description,
                location: report.location,
                reporter_name: report.reporter_name,
                reporter_contact: report.reporter_contact,
                media_urls: report.media_urls,
                report_date: Self::next_report_date(reports.last().map(|r| r.report_date)),
                ai_analysis: report.ai_analysis,
            };
            reports.push(stored.clone());
            stored
        };

        // no subscribers is not an error
        let _ = self.changes.send(ReportChange::Inserted { id: stored.id });

        tracing::info!("Incident report stored in memory: id={}", stored.id);
        Ok(stored)
    }

    async fn list_recent(&self) -> Result<Vec<IncidentReport>> {
        let reports = self
            .reports
            .read()
            .map_err(|e| AppError::Subscription(format!("report store lock poisoned: {}", e)))?;

        // insertion order is report_date order
        Ok(reports.iter().rev().cloned().collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<IncidentReport>> {
        let reports = self
            .reports
            .read()
            .map_err(|e| AppError::Subscription(format!("report store lock poisoned: {}", e)))?;

        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    fn subscribe(&self) -> broadcast::Receiver<ReportChange> {
        self.changes.subscribe()
    }
}
