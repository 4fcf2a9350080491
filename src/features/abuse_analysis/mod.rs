//! Optional AI assessment of a reported photo.
//!
//! The photo and description go to a generative model which answers with a
//! harm estimate and suggested resources. The result is attached to the
//! report when available; the report is stored either way.

pub mod models;
pub mod services;

pub use models::AiAnalysis;
pub use services::{AbuseAnalyzer, GeminiAnalyzer};
