use axum::Json;

use crate::features::educational_content::dtos::{educational_articles, ArticleDto};
use crate::shared::types::ApiResponse;

/// List awareness articles about animal abuse
#[utoipa::path(
    get,
    path = "/api/educational-content",
    responses(
        (status = 200, description = "Educational articles", body = ApiResponse<Vec<ArticleDto>>)
    ),
    tag = "educational-content"
)]
pub async fn list_articles() -> Json<ApiResponse<Vec<ArticleDto>>> {
    Json(ApiResponse::success(Some(educational_articles()), None))
}

#[cfg(test)]
mod tests {
    use crate::features::educational_content::routes::routes;
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_lists_all_articles_in_order() {
        let server = TestServer::new(routes()).unwrap();

        let response = server.get("/api/educational-content").await;
        response.assert_status_ok();
        let body: Value = response.json();
        let articles = body["data"].as_array().unwrap();
        assert_eq!(articles.len(), 4);
        assert_eq!(articles[0]["title"], "Como identificar maus-tratos a animais?");
        assert!(articles[1]["content"]
            .as_str()
            .unwrap()
            .contains("9.605/98"));
    }
}
