use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::abuse_analysis::AiAnalysis;
use crate::features::incident_reports::dtos::SubmitReportDto;
use crate::shared::constants::ANONYMOUS_REPORTER;

/// A stored incident report. Never updated once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentReport {
    pub id: Uuid,
    pub description: String,
    /// Empty when the reporter did not say where
    pub location: String,
    pub reporter_name: String,
    /// Empty when the reporter left no contact
    pub reporter_contact: String,
    /// At most one element: the photo as a data URI
    pub media_urls: Vec<String>,
    /// Assigned by the store at write time
    pub report_date: DateTime<Utc>,
    pub ai_analysis: Option<AiAnalysis>,
}

/// Report ready to be written; optional fields already defaulted.
///
/// The id is fixed before the write so a write whose acknowledgement is lost
/// can still be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncidentReport {
    pub id: Uuid,
    pub description: String,
    pub location: String,
    pub reporter_name: String,
    pub reporter_contact: String,
    pub media_urls: Vec<String>,
    pub ai_analysis: Option<AiAnalysis>,
}

fn trimmed_or(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl NewIncidentReport {
    /// Build the record from an already validated submission.
    pub fn from_submission(dto: SubmitReportDto, ai_analysis: Option<AiAnalysis>) -> Self {
        Self {
            id: Uuid::now_v7(),
            description: dto.description.trim().to_string(),
            location: trimmed_or(dto.location, ""),
            reporter_name: trimmed_or(dto.reporter_name, ANONYMOUS_REPORTER),
            reporter_contact: trimmed_or(dto.reporter_contact, ""),
            media_urls: vec![dto.photo_data_uri.trim().to_string()],
            ai_analysis,
        }
    }
}

/// Row shape of the `incident_reports` table
#[derive(Debug, Clone, FromRow)]
pub struct IncidentReportRow {
    pub id: Uuid,
    pub description: String,
    pub location: String,
    pub reporter_name: String,
    pub reporter_contact: String,
    pub media_urls: Vec<String>,
    pub report_date: DateTime<Utc>,
    pub abuse_estimate: Option<String>,
    pub ai_resources: Option<String>,
}

impl From<IncidentReportRow> for IncidentReport {
    fn from(row: IncidentReportRow) -> Self {
        let ai_analysis = row.abuse_estimate.map(|abuse_estimate| AiAnalysis {
            abuse_estimate,
            resources: row.ai_resources.unwrap_or_default(),
        });

        Self {
            id: row.id,
            description: row.description,
            location: row.location,
            reporter_name: row.reporter_name,
            reporter_contact: row.reporter_contact,
            media_urls: row.media_urls,
            report_date: row.report_date,
            ai_analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> SubmitReportDto {
        SubmitReportDto {
            description: "  Animal amarrado sem água por dias  ".to_string(),
            location: None,
            reporter_name: Some("   ".to_string()),
            reporter_contact: None,
            photo_data_uri: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[test]
    fn test_from_submission_defaults_optional_fields() {
        let report = NewIncidentReport::from_submission(submission(), None);
        assert_eq!(report.description, "Animal amarrado sem água por dias");
        assert_eq!(report.location, "");
        assert_eq!(report.reporter_name, "Anônimo");
        assert_eq!(report.reporter_contact, "");
        assert_eq!(report.media_urls, vec!["data:image/png;base64,AAAA".to_string()]);
        assert!(report.ai_analysis.is_none());
    }

    #[test]
    fn test_from_submission_keeps_given_fields() {
        let mut dto = submission();
        dto.location = Some("Rua das Flores, 10".to_string());
        dto.reporter_name = Some("Maria".to_string());
        dto.reporter_contact = Some("maria@example.com".to_string());

        let report = NewIncidentReport::from_submission(dto, None);
        assert_eq!(report.location, "Rua das Flores, 10");
        assert_eq!(report.reporter_name, "Maria");
        assert_eq!(report.reporter_contact, "maria@example.com");
    }

    #[test]
    fn test_row_without_estimate_has_no_analysis() {
        let row = IncidentReportRow {
            id: Uuid::now_v7(),
            description: "Cavalo ferido puxando carroça".to_string(),
            location: String::new(),
            reporter_name: "Anônimo".to_string(),
            reporter_contact: String::new(),
            media_urls: vec![],
            report_date: Utc::now(),
            abuse_estimate: None,
            ai_resources: Some("orphan".to_string()),
        };
        assert!(IncidentReport::from(row).ai_analysis.is_none());
    }
}
