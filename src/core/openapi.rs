use utoipa::{Modify, OpenApi};

use crate::features::abuse_analysis::AiAnalysis;
use crate::features::educational_content::{
    dtos as educational_dtos, handlers as educational_handlers,
};
use crate::features::incident_reports::{dtos as reports_dtos, handlers as reports_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Incident reports
        reports_handlers::report_handler::submit_report,
        reports_handlers::report_handler::list_reports,
        reports_handlers::report_handler::stream_reports,
        // Educational content
        educational_handlers::content_handler::list_articles,
    ),
    components(
        schemas(
            // Incident reports
            AiAnalysis,
            reports_dtos::SubmitReportDto,
            reports_dtos::ReportDisplayDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::ListingState,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::ListingState>,
            // Educational content
            educational_dtos::ArticleDto,
            ApiResponse<Vec<educational_dtos::ArticleDto>>,
        )
    ),
    tags(
        (name = "reports", description = "Animal-welfare incident reports (public)"),
        (name = "educational-content", description = "Awareness articles (public)"),
    ),
    info(
        title = "Animal Watch API",
        version = "0.1.0",
        description = "API documentation for Animal Watch",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
