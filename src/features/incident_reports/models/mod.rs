mod change;
mod incident_report;

pub use change::ReportChange;
pub use incident_report::{IncidentReport, IncidentReportRow, NewIncidentReport};
