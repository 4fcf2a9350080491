//! Prompt template management.
//!
//! Templates use Jinja2 syntax and live in `templates/prompts/`.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

/// Render the abuse analysis prompt sent alongside the photo.
///
/// # Arguments
/// * `description` - The reporter's description of the situation
/// * `json_schema` - JSON schema string for the expected output
pub fn render_abuse_analysis_prompt(
    description: &str,
    json_schema: &str,
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("description", Value::from(description));
    ctx.insert("json_schema", Value::from(json_schema));

    render_template("abuse_analysis/system.jinja", &ctx)
}
