use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    Json,
};
use tokio_stream::StreamExt;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::incident_reports::dtos::{ListingState, ReportResponseDto, SubmitReportDto};
use crate::features::incident_reports::routes::ReportState;
use crate::features::incident_reports::services::SubmissionOutcome;
use crate::shared::types::ApiResponse;

pub const STORED_MESSAGE: &str = "A sua denúncia foi processada e salva com sucesso.";
pub const ACCEPTED_MESSAGE: &str = "A sua denúncia foi recebida e será salva em instantes.";

/// Submit an incident report
///
/// The photo travels inline as a data URI. When AI analysis is configured
/// its result is attached to the stored report; an analysis failure does not
/// fail the submission.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = SubmitReportDto,
    responses(
        (status = 201, description = "Report stored", body = ApiResponse<ReportResponseDto>),
        (status = 202, description = "Report accepted, write in progress (best-effort policy)", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 503, description = "The report could not be stored")
    ),
    tag = "reports"
)]
pub async fn submit_report(
    State(state): State<ReportState>,
    AppJson(dto): AppJson<SubmitReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let response = match state.intake.submit(dto).await? {
        SubmissionOutcome::Stored(report) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(ReportResponseDto::from_report(
                    report,
                    state.listing.display_offset(),
                )),
                Some(STORED_MESSAGE.to_string()),
            )),
        ),
        SubmissionOutcome::Accepted => (
            StatusCode::ACCEPTED,
            Json(ApiResponse::success(None, Some(ACCEPTED_MESSAGE.to_string()))),
        ),
    };

    Ok(response)
}

/// List reports, newest first
///
/// A failed query is reported as the `error` listing state, not as a
/// transport error.
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Current listing state", body = ApiResponse<ListingState>)
    ),
    tag = "reports"
)]
pub async fn list_reports(State(state): State<ReportState>) -> Json<ApiResponse<ListingState>> {
    Json(ApiResponse::success(Some(state.listing.snapshot().await), None))
}

/// Live listing over Server-Sent Events
///
/// Emits a `snapshot` event with the `loading` state, then one with the
/// current contents, then a fresh one whenever the collection changes.
#[utoipa::path(
    get,
    path = "/api/reports/stream",
    responses(
        (status = 200, description = "Stream of `snapshot` events", body = ListingState, content_type = "text/event-stream")
    ),
    tag = "reports"
)]
pub async fn stream_reports(State(state): State<ReportState>) -> Response {
    let stream = state.listing.watch().map(|listing| {
        let event = Event::default()
            .event("snapshot")
            .json_data(&listing)
            .unwrap_or_else(|e| {
                tracing::error!("Failed to serialize listing snapshot: {}", e);
                Event::default().event("snapshot").data(r#"{"state":"error"}"#)
            });
        Ok::<_, Infallible>(event)
    });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("ping"),
        )
        .into_response()
}
