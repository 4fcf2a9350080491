mod memory;
mod postgres;

pub use memory::InMemoryReportRepository;
pub use postgres::PgReportRepository;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::incident_reports::models::{IncidentReport, NewIncidentReport, ReportChange};

/// Capacity of the change fan-out channel. Slow subscribers that fall further
/// behind are told to resync instead of replaying every event.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Persistence seam for incident reports.
///
/// Reports are append-only: there is no update or delete.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a report under its pre-assigned id. The store assigns `report_date`.
    async fn insert(&self, report: NewIncidentReport) -> Result<IncidentReport>;

    /// Look up one stored report; used to settle writes whose outcome was lost
    async fn find(&self, id: Uuid) -> Result<Option<IncidentReport>>;

    /// Every stored report, newest `report_date` first
    async fn list_recent(&self) -> Result<Vec<IncidentReport>>;

    /// Change notifications for reports written after this call
    fn subscribe(&self) -> broadcast::Receiver<ReportChange>;
}
