use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::abuse_analysis::models::AiAnalysis;

/// Estimates harm from a photo and the reporter's description.
///
/// Implementations make a single attempt; callers bound the call with a timeout.
#[async_trait]
pub trait AbuseAnalyzer: Send + Sync {
    async fn analyze(&self, photo_data_uri: &str, description: &str) -> Result<AiAnalysis>;
}
