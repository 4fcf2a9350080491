mod analyzer;
mod gemini_analyzer;

pub use analyzer::AbuseAnalyzer;
pub use gemini_analyzer::GeminiAnalyzer;
