//! HTML page rendering.
//!
//! Page templates are compiled into the binary. Templates ending in `.html`
//! are auto-escaped.

use minijinja::{Environment, Value};
use std::sync::OnceLock;

use crate::shared::prompts::TemplateError;

static PAGE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const PAGE_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/pages/base.html")),
    (
        "report_form.html",
        include_str!("../../templates/pages/report_form.html"),
    ),
    (
        "report_list.html",
        include_str!("../../templates/pages/report_list.html"),
    ),
    ("reports.html", include_str!("../../templates/pages/reports.html")),
];

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    for (name, source) in PAGE_TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load page template {}: {}", name, e);
        }
    }
    env
}

/// Render a page template, e.g. `render_page("reports.html", context! { .. })`
pub fn render_page(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = PAGE_ENV
        .get_or_init(init_environment)
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
