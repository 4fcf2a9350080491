use uuid::Uuid;

/// Notification that the report collection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportChange {
    Inserted { id: Uuid },
    /// Notifications may have been missed (listener reconnected); re-read everything
    Resync,
}

impl ReportChange {
    /// Interpret a `pg_notify` payload, which carries the inserted id
    pub fn from_notification_payload(payload: &str) -> Self {
        match Uuid::parse_str(payload.trim()) {
            Ok(id) => ReportChange::Inserted { id },
            Err(_) => ReportChange::Resync,
        }
    }
}
