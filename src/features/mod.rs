pub mod abuse_analysis;
pub mod educational_content;
pub mod incident_reports;
