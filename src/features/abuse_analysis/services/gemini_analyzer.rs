use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use crate::core::config::AnalysisConfig;
use crate::core::error::{AppError, Result};
use crate::features::abuse_analysis::models::{AbuseAssessment, AiAnalysis};
use crate::features::abuse_analysis::services::AbuseAnalyzer;
use crate::shared::data_uri::PhotoDataUri;
use crate::shared::llm::{parse_with_fallback, LlmResponse};
use crate::shared::prompts::render_abuse_analysis_prompt;

/// Abuse analysis backed by the Gemini `generateContent` REST API.
///
/// The photo is sent as `inline_data` next to the rendered prompt, and the
/// model is asked for a JSON reply.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiAnalyzer {
    /// Returns `None` when analysis is switched off or no API key is configured.
    pub fn from_config(config: &AnalysisConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .user_agent("AnimalWatchCore/0.1 (incident-report-analysis)")
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Some(Self::new(client, api_key, &config.base_url, &config.model)))
    }

    pub fn new(client: reqwest::Client, api_key: String, base_url: &str, model: &str) -> Self {
        Self {
            client,
            api_key,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
        }
    }

    fn build_request(prompt: &str, photo: &PhotoDataUri<'_>) -> JsonValue {
        json!({
            "generationConfig": { "response_mime_type": "application/json" },
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    { "inline_data": { "mime_type": photo.mime_type, "data": photo.payload } }
                ]
            }]
        })
    }
}

/// First text part of the first candidate
fn extract_candidate_text(v: &JsonValue) -> Option<&str> {
    v.get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .iter()
        .find_map(|p| p.get("text").and_then(|t| t.as_str()))
}

#[async_trait]
impl AbuseAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, photo_data_uri: &str, description: &str) -> Result<AiAnalysis> {
        let photo = PhotoDataUri::parse(photo_data_uri)
            .map_err(|e| AppError::Analysis(format!("photo cannot be analyzed: {}", e)))?;

        let prompt =
            render_abuse_analysis_prompt(description, &AbuseAssessment::json_schema_string())
                .map_err(|e| AppError::Analysis(format!("prompt rendering failed: {}", e)))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(&prompt, &photo))
            .send()
            .await
            .map_err(|e| AppError::Analysis(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Gemini returned status {}: {}", status, body);
            return Err(AppError::Analysis(format!("Gemini returned status {}", status)));
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| AppError::Analysis(format!("Failed to read Gemini response: {}", e)))?;

        let text = extract_candidate_text(&body)
            .ok_or_else(|| AppError::Analysis("Gemini response has no text candidate".to_string()))?;

        let analysis = AiAnalysis::try_from(parse_with_fallback::<AbuseAssessment>(text))?;
        tracing::debug!(
            "Abuse analysis completed: estimate_len={}, resources_len={}",
            analysis.abuse_estimate.len(),
            analysis.resources.len()
        );
        Ok(analysis)
    }
}
