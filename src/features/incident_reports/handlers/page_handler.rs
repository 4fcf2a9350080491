use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive},
        Html, IntoResponse, Response, Sse,
    },
};
use minijinja::{context, Value};
use serde::Serialize;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::abuse_analysis::AiAnalysis;
use crate::features::educational_content::dtos::educational_articles;
use crate::features::incident_reports::dtos::{ListingState, SubmitReportDto};
use crate::features::incident_reports::handlers::report_handler::{
    ACCEPTED_MESSAGE, STORED_MESSAGE,
};
use crate::features::incident_reports::routes::ReportState;
use crate::features::incident_reports::services::SubmissionOutcome;
use crate::shared::constants::{
    DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, MAX_PHOTO_SIZE, OPTIONAL_FIELD_MAX_CHARS,
};
use crate::shared::data_uri;
use crate::shared::pages::render_page;

/// Values echoed back into the form after a rejected submission
#[derive(Debug, Default, Serialize)]
struct FormValues {
    description: String,
    location: String,
    reporter_name: String,
    reporter_contact: String,
}

#[derive(Debug, Serialize)]
struct Flash {
    kind: &'static str,
    title: &'static str,
    text: String,
    errors: Vec<String>,
}

fn render(template: &str, ctx: Value) -> Result<Html<String>> {
    render_page(template, ctx)
        .map(Html)
        .map_err(|e| AppError::Internal(format!("page rendering failed: {}", e)))
}

fn form_page(
    flash: Option<Flash>,
    values: &FormValues,
    analysis: Option<&AiAnalysis>,
) -> Result<Html<String>> {
    render(
        "report_form.html",
        context! {
            flash => Value::from_serialize(&flash),
            values => Value::from_serialize(values),
            analysis => Value::from_serialize(&analysis),
            articles => Value::from_serialize(educational_articles()),
            limits => context! {
                description_min => DESCRIPTION_MIN_CHARS,
                description_max => DESCRIPTION_MAX_CHARS,
                optional_max => OPTIONAL_FIELD_MAX_CHARS,
                photo_max_bytes => MAX_PHOTO_SIZE,
                photo_max_mb => MAX_PHOTO_SIZE / 1024 / 1024,
                accept => "image/*",
            },
        },
    )
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Report form
pub async fn report_form_page() -> Result<Html<String>> {
    form_page(None, &FormValues::default(), None)
}

/// Handle the HTML form post.
///
/// The uploaded photo is encoded into a data URI here, before the report
/// enters the intake pipeline, so both entry points share one contract.
pub async fn submit_report_form(
    State(state): State<ReportState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Html<String>)> {
    let mut values = FormValues::default();
    let mut photo_data_uri = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Falha ao ler o formulário: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "photo" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read photo bytes: {}", e);
                    AppError::BadRequest(format!("Falha ao ler a imagem: {}", e))
                })?;
                // browsers send an empty part when no file was chosen
                if !data.is_empty() {
                    photo_data_uri = data_uri::encode(&content_type, &data);
                }
            }
            "description" | "location" | "reporterName" | "reporterContact" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Falha ao ler o campo {}: {}", field_name, e))
                })?;
                match field_name.as_str() {
                    "description" => values.description = text,
                    "location" => values.location = text,
                    "reporterName" => values.reporter_name = text,
                    _ => values.reporter_contact = text,
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let dto = SubmitReportDto {
        description: values.description.clone(),
        location: non_empty(values.location.clone()),
        reporter_name: non_empty(values.reporter_name.clone()),
        reporter_contact: non_empty(values.reporter_contact.clone()),
        photo_data_uri,
    };

    match state.intake.submit(dto).await {
        Ok(outcome) => {
            let (text, analysis) = match outcome {
                SubmissionOutcome::Stored(report) => (STORED_MESSAGE, report.ai_analysis),
                SubmissionOutcome::Accepted => (ACCEPTED_MESSAGE, None),
            };
            let flash = Flash {
                kind: "success",
                title: "Denúncia enviada",
                text: text.to_string(),
                errors: Vec::new(),
            };
            let page = form_page(Some(flash), &FormValues::default(), analysis.as_ref())?;
            Ok((StatusCode::CREATED, page))
        }
        Err(e) => {
            let flash = Flash {
                kind: "error",
                title: "Não foi possível enviar a denúncia",
                text: e.user_message(),
                errors: e.details().map(<[String]>::to_vec).unwrap_or_default(),
            };
            let page = form_page(Some(flash), &values, None)?;
            Ok((e.status_code(), page))
        }
    }
}

fn render_listing(listing: &ListingState) -> Result<Html<String>> {
    render(
        "report_list.html",
        context! { listing => Value::from_serialize(listing) },
    )
}

/// Listing markup for every settled state of a live listing, in order.
///
/// `Loading` is skipped so the page keeps what it shows while re-querying.
fn listing_updates(
    states: impl Stream<Item = ListingState>,
) -> impl Stream<Item = String> {
    states
        .filter(|listing| *listing != ListingState::Loading)
        .filter_map(|listing| match render_listing(&listing) {
            Ok(Html(markup)) => Some(markup),
            Err(e) => {
                tracing::error!("Failed to render live listing: {}", e);
                None
            }
        })
}

/// Listing page with live refresh
pub async fn reports_page(State(state): State<ReportState>) -> Result<Html<String>> {
    let listing = state.listing.snapshot().await;
    render(
        "reports.html",
        context! { listing => Value::from_serialize(&listing) },
    )
}

/// Live listing markup over Server-Sent Events.
///
/// Each `listing` event carries the fragment rendered from the snapshot that
/// triggered it, so the page applies updates in the order they happened.
pub async fn stream_reports_page(State(state): State<ReportState>) -> Response {
    let stream = listing_updates(state.listing.watch())
        .map(|markup| Ok::<_, Infallible>(Event::default().event("listing").data(markup)));

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("ping"),
        )
        .into_response()
}

/// Photo of a stored report. Reports never change, so it is cached for good.
pub async fn report_photo(
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let (mime_type, bytes) = state.listing.photo(id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, mime_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WritePolicy;
    use crate::features::incident_reports::repository::{
        InMemoryReportRepository, ReportRepository,
    };
    use crate::features::incident_reports::services::ListingService;
    use crate::shared::test_helpers::{
        display_offset, new_report, report_router, FailingRepository,
    };
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::sync::Arc;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    async fn next_markup(updates: &mut (impl Stream<Item = String> + Unpin)) -> String {
        tokio::time::timeout(Duration::from_secs(2), updates.next())
            .await
            .expect("live listing stalled")
            .expect("live listing ended")
    }

    fn photo_part() -> Part {
        Part::bytes(STANDARD.decode(PNG_1X1).unwrap())
            .file_name("gato.png")
            .mime_type("image/png")
    }

    #[tokio::test]
    async fn test_form_page_renders() {
        let server = TestServer::new(report_router(
            Arc::new(InMemoryReportRepository::new()),
            None,
            WritePolicy::Durable,
        ))
        .unwrap();

        let response = server.get("/").await;
        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("action=\"/reports/new\""));
        assert!(html.contains("minlength=\"10\""));
        assert!(html.contains("Como identificar maus-tratos a animais?"));
    }

    #[tokio::test]
    async fn test_form_post_encodes_photo_and_stores_report() {
        let repo = Arc::new(InMemoryReportRepository::new());
        let server =
            TestServer::new(report_router(repo.clone(), None, WritePolicy::Durable)).unwrap();

        let form = MultipartForm::new()
            .add_text("description", "Gato preso em telhado há dois dias")
            .add_text("location", "Rua das Flores, 10")
            .add_text("reporterName", "")
            .add_part("photo", photo_part());

        let response = server.post("/reports/new").multipart(form).await;
        response.assert_status(StatusCode::CREATED);
        assert!(response.text().contains("salva com sucesso"));

        let stored = repo.list_recent().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].location, "Rua das Flores, 10");
        assert_eq!(stored[0].reporter_name, "Anônimo");
        assert_eq!(
            stored[0].media_urls,
            vec![format!("data:image/png;base64,{}", PNG_1X1)]
        );
    }

    #[tokio::test]
    async fn test_form_post_without_photo_keeps_values() {
        let repo = Arc::new(InMemoryReportRepository::new());
        let server =
            TestServer::new(report_router(repo.clone(), None, WritePolicy::Durable)).unwrap();

        let form = MultipartForm::new()
            .add_text("description", "Cachorro sem água no quintal")
            .add_text("location", "Centro");

        let response = server.post("/reports/new").multipart(form).await;
        response.assert_status_bad_request();
        let html = response.text();
        assert!(html.contains("Dados de entrada inválidos."));
        assert!(html.contains("Cachorro sem água no quintal"));
        assert!(repo.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reports_page_states() {
        let repo = Arc::new(InMemoryReportRepository::new());
        let server =
            TestServer::new(report_router(repo.clone(), None, WritePolicy::Durable)).unwrap();

        let empty = server.get("/reports").await.text();
        assert!(empty.contains("Nenhuma denúncia registrada ainda."));

        let form = MultipartForm::new()
            .add_text("description", "Cavalo ferido puxando carroça")
            .add_part("photo", photo_part());
        server.post("/reports/new").multipart(form).await;

        let page = server.get("/reports").await.text();
        assert!(page.contains("Denúncia em Local não informado"));
        assert!(page.contains("Cavalo ferido puxando carroça"));
        assert!(page.contains("new EventSource(\"/reports/stream\")"));
        assert!(!page.contains("data:image/png;base64"));
    }

    #[tokio::test]
    async fn test_report_photo_is_served_from_its_own_url() {
        let repo = Arc::new(InMemoryReportRepository::new());
        let server =
            TestServer::new(report_router(repo.clone(), None, WritePolicy::Durable)).unwrap();

        let form = MultipartForm::new()
            .add_text("description", "Cachorro sem abrigo na chuva")
            .add_part("photo", photo_part());
        server.post("/reports/new").multipart(form).await;
        let id = repo.list_recent().await.unwrap()[0].id;

        let page = server.get("/reports").await.text();
        assert!(page.contains(&format!("src=\"/reports/{}/photo\"", id)));

        let photo = server.get(&format!("/reports/{}/photo", id)).await;
        photo.assert_status_ok();
        photo.assert_header("content-type", "image/png");
        assert_eq!(photo.as_bytes().to_vec(), STANDARD.decode(PNG_1X1).unwrap());

        server
            .get(&format!("/reports/{}/photo", Uuid::now_v7()))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_live_listing_markup_follows_every_insert_in_order() {
        let repo = Arc::new(InMemoryReportRepository::new());
        let service = Arc::new(ListingService::new(repo.clone(), display_offset()));
        let mut updates = Box::pin(listing_updates(service.watch()));

        let first = next_markup(&mut updates).await;
        assert!(first.contains("Nenhuma denúncia registrada ainda."));

        let stored = repo
            .insert(new_report("Papagaio em gaiola minúscula"))
            .await
            .unwrap();
        let second = next_markup(&mut updates).await;
        assert!(second.contains("Papagaio em gaiola minúscula"));
        assert!(second.contains(&format!("/reports/{}/photo", stored.id)));
        assert!(!second.contains("data:image/png;base64"));

        repo.insert(new_report("Cavalo magro sem ferradura"))
            .await
            .unwrap();
        let third = next_markup(&mut updates).await;
        let newest = third.find("Cavalo magro sem ferradura").unwrap();
        let older = third.find("Papagaio em gaiola minúscula").unwrap();
        assert!(newest < older);
    }

    #[tokio::test]
    async fn test_reports_page_error_state() {
        let server = TestServer::new(report_router(
            Arc::new(FailingRepository),
            None,
            WritePolicy::Durable,
        ))
        .unwrap();

        let html = server.get("/reports").await.text();
        assert!(html.contains("Erro ao carregar as denúncias"));
    }
}
