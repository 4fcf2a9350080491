use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::abuse_analysis::AiAnalysis;
use crate::features::incident_reports::display;
use crate::features::incident_reports::models::IncidentReport;
use crate::shared::constants::{DESCRIPTION_MAX_CHARS, OPTIONAL_FIELD_MAX_CHARS};
use crate::shared::validation::{validate_description, validate_photo_data_uri};

/// Request DTO for submitting an incident report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportDto {
    /// What was seen: the animal's condition, the surroundings (min 10 characters)
    #[validate(
        length(
            max = DESCRIPTION_MAX_CHARS,
            message = "A descrição deve ter no máximo 5000 caracteres."
        ),
        custom(function = validate_description)
    )]
    #[schema(example = "Animal amarrado sem água por dias")]
    pub description: String,

    #[validate(length(
        max = OPTIONAL_FIELD_MAX_CHARS,
        message = "O local deve ter no máximo 255 caracteres."
    ))]
    pub location: Option<String>,

    #[validate(length(
        max = OPTIONAL_FIELD_MAX_CHARS,
        message = "O nome deve ter no máximo 255 caracteres."
    ))]
    pub reporter_name: Option<String>,

    #[validate(length(
        max = OPTIONAL_FIELD_MAX_CHARS,
        message = "O contato deve ter no máximo 255 caracteres."
    ))]
    pub reporter_contact: Option<String>,

    /// Photo as `data:<mimetype>;base64,<data>` (max 5MB decoded)
    #[validate(custom(function = validate_photo_data_uri))]
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub photo_data_uri: String,
}

/// Human-readable fields for rendering a report card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDisplayDto {
    /// "Denúncia em <local>"
    pub title: String,
    pub formatted_date: String,
    pub location: String,
    pub reporter_name: String,
    pub reporter_contact: String,
}

/// Response DTO for a stored report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub description: String,
    pub location: String,
    pub reporter_name: String,
    pub reporter_contact: String,
    pub media_urls: Vec<String>,
    pub report_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
    pub display: ReportDisplayDto,
}

impl ReportResponseDto {
    pub fn from_report(report: IncidentReport, offset: &FixedOffset) -> Self {
        let location = display::location_or_fallback(&report.location).to_string();
        let display = ReportDisplayDto {
            title: format!("Denúncia em {}", location),
            formatted_date: display::format_report_date(Some(report.report_date), offset),
            location,
            reporter_name: display::reporter_or_fallback(&report.reporter_name).to_string(),
            reporter_contact: display::contact_or_fallback(&report.reporter_contact).to_string(),
        };

        Self {
            id: report.id,
            description: report.description,
            location: report.location,
            reporter_name: report.reporter_name,
            reporter_contact: report.reporter_contact,
            media_urls: report.media_urls,
            report_date: report.report_date,
            ai_analysis: report.ai_analysis,
            display,
        }
    }
}

/// What the listing view shows. Exactly one state at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ListingState {
    /// No data delivered yet
    Loading,
    /// The collection could not be read
    Error { message: String },
    /// The collection is empty
    Empty,
    /// Newest report first
    Populated { reports: Vec<ReportResponseDto> },
}

impl ListingState {
    pub fn from_reports(reports: Vec<ReportResponseDto>) -> Self {
        if reports.is_empty() {
            ListingState::Empty
        } else {
            ListingState::Populated { reports }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    const PHOTO: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn dto(description: &str, photo: &str) -> SubmitReportDto {
        SubmitReportDto {
            description: description.to_string(),
            location: None,
            reporter_name: None,
            reporter_contact: None,
            photo_data_uri: photo.to_string(),
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let description: String = Sentence(8..12).fake();
        assert!(dto(&description, PHOTO).validate().is_ok());
    }

    #[test]
    fn test_short_description_is_rejected() {
        let errors = dto("curto", PHOTO).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_missing_photo_is_rejected() {
        let errors = dto("Animal amarrado sem água por dias", "")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("photo_data_uri"));
    }

    #[test]
    fn test_overlong_optional_field_is_rejected() {
        let mut submission = dto("Animal amarrado sem água por dias", PHOTO);
        submission.location = Some("x".repeat(256));
        let errors = submission.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("location"));
    }

    #[test]
    fn test_length_limits_match_the_form_limits() {
        let at_limit = |n: u64| "x".repeat(n as usize);

        let mut submission = dto(&at_limit(DESCRIPTION_MAX_CHARS), PHOTO);
        submission.reporter_contact = Some(at_limit(OPTIONAL_FIELD_MAX_CHARS));
        assert!(submission.validate().is_ok());

        submission.description = at_limit(DESCRIPTION_MAX_CHARS + 1);
        submission.reporter_contact = Some(at_limit(OPTIONAL_FIELD_MAX_CHARS + 1));
        let errors = submission.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
        assert!(errors.field_errors().contains_key("reporter_contact"));
    }

    #[test]
    fn test_submission_deserializes_camel_case() {
        let submission: SubmitReportDto = serde_json::from_value(serde_json::json!({
            "description": "Animal amarrado sem água por dias",
            "reporterName": "Ana",
            "photoDataUri": PHOTO,
        }))
        .unwrap();
        assert_eq!(submission.reporter_name.as_deref(), Some("Ana"));
        assert!(submission.location.is_none());
    }

    #[test]
    fn test_response_display_applies_fallbacks() {
        let report = IncidentReport {
            id: Uuid::now_v7(),
            description: "Animal amarrado sem água por dias".to_string(),
            location: String::new(),
            reporter_name: "Anônimo".to_string(),
            reporter_contact: String::new(),
            media_urls: vec![PHOTO.to_string()],
            report_date: Utc.with_ymd_and_hms(2026, 10, 17, 17, 30, 0).unwrap(),
            ai_analysis: None,
        };
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();

        let response = ReportResponseDto::from_report(report, &offset);
        assert_eq!(response.display.title, "Denúncia em Local não informado");
        assert_eq!(response.display.reporter_name, "Anônimo");
        assert_eq!(response.display.reporter_contact, "Não informado");
        assert_eq!(
            response.display.formatted_date,
            "17 de outubro de 2026 às 14:30"
        );
    }

    #[test]
    fn test_listing_state_tagging() {
        assert_eq!(ListingState::from_reports(vec![]), ListingState::Empty);
        assert_eq!(
            serde_json::to_value(ListingState::Loading).unwrap(),
            serde_json::json!({ "state": "loading" })
        );
        assert_eq!(
            serde_json::to_value(ListingState::Error {
                message: "falhou".to_string()
            })
            .unwrap(),
            serde_json::json!({ "state": "error", "message": "falhou" })
        );
    }
}
