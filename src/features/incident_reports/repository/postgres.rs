use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{ReportRepository, CHANGE_CHANNEL_CAPACITY};
use crate::core::error::{AppError, Result};
use crate::features::incident_reports::models::{
    IncidentReport, IncidentReportRow, NewIncidentReport, ReportChange,
};

/// Channel the `incident_reports` insert trigger notifies on
pub const CHANGE_CHANNEL: &str = "incident_reports_changed";

const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Columns every report query returns
const REPORT_COLUMNS: &str = "id, description, location, reporter_name, reporter_contact, \
     media_urls, report_date, abuse_estimate, ai_resources";

/// A failed write. The transaction is rolled back, so nothing was stored.
fn write_failed(e: sqlx::Error) -> AppError {
    tracing::error!("Failed to insert incident report: {:?}", e);
    AppError::Persistence(format!("insert failed: {}", e))
}

/// `statement_timeout` value for a write bound, in milliseconds
fn statement_timeout_setting(write_timeout: Duration) -> String {
    format!("{}ms", write_timeout.as_millis().max(1))
}

/// PostgreSQL-backed report store.
///
/// Change notifications come from `LISTEN incident_reports_changed`, so writes
/// made by other processes against the same database are seen as well.
///
/// Inserts run in their own transaction under `SET LOCAL statement_timeout`,
/// so a write that overruns its bound is cancelled and rolled back by the
/// server instead of landing after the caller gave up.
pub struct PgReportRepository {
    pool: PgPool,
    write_timeout: Duration,
    changes: broadcast::Sender<ReportChange>,
}

impl PgReportRepository {
    pub fn new(pool: PgPool, write_timeout: Duration) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            pool,
            write_timeout,
            changes,
        }
    }

    /// Forward database notifications to subscribers until the process exits.
    ///
    /// After a lost connection the listener reconnects and emits
    /// [`ReportChange::Resync`], since notifications sent in between are gone.
    pub fn spawn_change_listener(&self) -> JoinHandle<()> {
        let pool = self.pool.clone();
        let changes = self.changes.clone();

        tokio::spawn(async move {
            loop {
                let mut listener = match PgListener::connect_with(&pool).await {
                    Ok(listener) => listener,
                    Err(e) => {
                        tracing::error!("Failed to connect report change listener: {:?}", e);
                        tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                        continue;
                    }
                };
                if let Err(e) = listener.listen(CHANGE_CHANNEL).await {
                    tracing::error!("Failed to LISTEN on {}: {:?}", CHANGE_CHANNEL, e);
                    tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                    continue;
                }
                tracing::info!("Listening for report changes on '{}'", CHANGE_CHANNEL);

                loop {
                    match listener.try_recv().await {
                        Ok(Some(notification)) => {
                            let change =
                                ReportChange::from_notification_payload(notification.payload());
                            tracing::debug!("Report change received: {:?}", change);
                            let _ = changes.send(change);
                        }
                        Ok(None) => {
                            // try_recv reconnects on the next call
                            tracing::warn!("Report change listener lost its connection");
                            let _ = changes.send(ReportChange::Resync);
                        }
                        Err(e) => {
                            tracing::error!("Report change listener failed: {:?}", e);
                            let _ = changes.send(ReportChange::Resync);
                            tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn insert(&self, report: NewIncidentReport) -> Result<IncidentReport> {
        let (abuse_estimate, ai_resources) = match report.ai_analysis {
            Some(analysis) => (Some(analysis.abuse_estimate), Some(analysis.resources)),
            None => (None, None),
        };

        let mut tx = self.pool.begin().await.map_err(write_failed)?;

        sqlx::query("SELECT set_config('statement_timeout', $1, true)")
            .bind(statement_timeout_setting(self.write_timeout))
            .execute(&mut *tx)
            .await
            .map_err(write_failed)?;

        let row = sqlx::query_as::<_, IncidentReportRow>(&format!(
            r#"
            INSERT INTO incident_reports
                (id, description, location, reporter_name, reporter_contact,
                 media_urls, abuse_estimate, ai_resources)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(report.id)
        .bind(&report.description)
        .bind(&report.location)
        .bind(&report.reporter_name)
        .bind(&report.reporter_contact)
        .bind(&report.media_urls)
        .bind(abuse_estimate)
        .bind(ai_resources)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_failed)?;

        tx.commit().await.map_err(write_failed)?;

        tracing::info!(
            "Incident report stored: id={}, analyzed={}",
            row.id,
            row.abuse_estimate.is_some()
        );

        Ok(row.into())
    }

    async fn list_recent(&self) -> Result<Vec<IncidentReport>> {
        let rows = sqlx::query_as::<_, IncidentReportRow>(&format!(
            "SELECT {} FROM incident_reports ORDER BY report_date DESC, id DESC",
            REPORT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Subscription(format!("failed to query incident reports: {}", e)))?;

        Ok(rows.into_iter().map(IncidentReport::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<IncidentReport>> {
        let row = sqlx::query_as::<_, IncidentReportRow>(&format!(
            "SELECT {} FROM incident_reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Subscription(format!("failed to look up report {}: {}", id, e)))?;

        Ok(row.map(IncidentReport::from))
    }

    fn subscribe(&self) -> broadcast::Receiver<ReportChange> {
        self.changes.subscribe()
    }
}
