use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::AppError;
use crate::shared::llm::LlmResponse;

fn default_true() -> bool {
    true
}

/// Analysis attached to a stored report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    /// Estimated degree of harm, abuse or neglect, with reasoning
    pub abuse_estimate: String,
    /// Suggested shelters, veterinary services or organizations
    pub resources: String,
}

/// Raw model output for the abuse analysis prompt
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[schemars(title = "AbuseAssessment")]
#[serde(rename_all = "camelCase")]
pub struct AbuseAssessment {
    #[schemars(
        description = "Estimate of the degree of harm, abuse, or neglect (e.g. 'baixo', 'moderado', 'alto') with a short explanation"
    )]
    pub abuse_estimate: String,

    #[schemars(description = "Tailored resources that can help the animal")]
    pub resources: String,

    #[serde(default = "default_true")]
    #[schemars(skip)]
    pub is_llm_success: bool,

    #[serde(default)]
    #[schemars(skip)]
    pub llm_error_message: Option<String>,
}

impl LlmResponse for AbuseAssessment {
    fn mark_as_fallback(&mut self, error_message: String) {
        self.is_llm_success = false;
        self.llm_error_message = Some(error_message);
    }

    fn is_success(&self) -> bool {
        self.is_llm_success
    }
}

impl TryFrom<AbuseAssessment> for AiAnalysis {
    type Error = AppError;

    fn try_from(a: AbuseAssessment) -> Result<Self, Self::Error> {
        if !a.is_success() {
            return Err(AppError::Analysis(
                a.llm_error_message
                    .unwrap_or_else(|| "unparseable model response".to_string()),
            ));
        }
        if a.abuse_estimate.trim().is_empty() {
            return Err(AppError::Analysis(
                "model response has an empty abuseEstimate".to_string(),
            ));
        }

        Ok(Self {
            abuse_estimate: a.abuse_estimate.trim().to_string(),
            resources: a.resources.trim().to_string(),
        })
    }
}
