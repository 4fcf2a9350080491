use lazy_static::lazy_static;
use regex::Regex;

use super::LlmResponse;

lazy_static! {
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// `"a" + "b"` style concatenation, which some models emit inside JSON
    static ref STRING_CONCAT_RE: Regex = Regex::new(r#""\s*\+\s*""#).unwrap();
}

/// Pull the JSON object out of a model reply.
///
/// Accepts a ```json fenced block, any fenced block, a bare object, or an
/// object embedded in surrounding prose (first `{` to last `}`).
fn extract_json_object(text: &str) -> Result<&str, String> {
    if let Some((_, after)) = text.split_once("```json") {
        return after
            .split("```")
            .next()
            .map(str::trim)
            .ok_or_else(|| "Unterminated ```json block".to_string());
    }

    if let Some((_, after)) = text.split_once("```") {
        // skip an optional language tag on the opening fence line
        if let Some((_, body)) = after.split_once('\n') {
            if let Some((block, _)) = body.split_once("```") {
                return Ok(block.trim());
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let start = text
        .find('{')
        .ok_or_else(|| "No JSON object found in response".to_string())?;
    let end = text
        .rfind('}')
        .ok_or_else(|| "Incomplete JSON object in response".to_string())?;

    if start < end {
        Ok(&text[start..=end])
    } else {
        Err("Invalid JSON boundaries in response".to_string())
    }
}

fn apply_quick_fixes(json: &str) -> String {
    let joined = STRING_CONCAT_RE.replace_all(json, "");
    TRAILING_COMMA_RE.replace_all(&joined, "$1").into_owned()
}

fn repair(json: &str) -> Option<String> {
    let options = llm_json::RepairOptions::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json, &options)
    }));

    match result {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("JSON repair failed: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("JSON repair panicked");
            None
        }
    }
}

/// Direct parse, then quick fixes, then `llm_json` repair.
fn try_parse<T: LlmResponse>(text: &str) -> Result<T, String> {
    let json = extract_json_object(text)?;

    if let Ok(parsed) = serde_json::from_str::<T>(json) {
        return Ok(parsed);
    }

    if let Ok(parsed) = serde_json::from_str::<T>(&apply_quick_fixes(json)) {
        tracing::debug!("Model JSON parsed after quick fixes");
        return Ok(parsed);
    }

    if let Some(repaired) = repair(json) {
        if let Ok(parsed) = serde_json::from_str::<T>(&repaired) {
            tracing::debug!("Model JSON parsed after llm_json repair");
            return Ok(parsed);
        }
    }

    Err(format!(
        "Failed to parse JSON after all repair attempts. Original: {}",
        json.chars().take(200).collect::<String>()
    ))
}

/// Parse a model reply into `T`, or return `T::default()` marked as a
/// fallback carrying the parse error.
pub fn parse_with_fallback<T: LlmResponse>(text: &str) -> T {
    match try_parse::<T>(text) {
        Ok(parsed) => parsed,
        Err(error_msg) => {
            tracing::warn!("Model response parsing failed, using fallback: {}", error_msg);
            let mut fallback = T::default();
            fallback.mark_as_fallback(error_msg);
            fallback
        }
    }
}
