mod assessment;

pub use assessment::{AbuseAssessment, AiAnalysis};
