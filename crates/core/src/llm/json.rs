use crate::domain::contract::LlmRecommendation;
use crate::domain::recommendation::Recommendation;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Defensive parse of raw model output. Any defect (no JSON object, malformed
/// JSON, missing keys, bad confidence, unknown action) degrades to the fixed
/// fallback; this never returns an error.
pub fn parse_recommendation(text: &str) -> Recommendation {
    match try_parse(text) {
        Ok(rec) => rec,
        Err(err) => {
            tracing::warn!(error = %err, "unusable LLM output; using fallback recommendation");
            Recommendation::fallback()
        }
    }
}

fn try_parse(text: &str) -> anyhow::Result<Recommendation> {
    let json_str = extract_json(text).context("no JSON object in LLM output")?;
    let parsed = serde_json::from_str::<LlmRecommendation>(&json_str)
        .with_context(|| format!("LLM output is not a valid recommendation object: {json_str}"))?;
    parsed.validate_and_into_recommendation()
}
