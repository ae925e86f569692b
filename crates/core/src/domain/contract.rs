use crate::domain::recommendation::{Action, Recommendation};
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The loose shape the model actually returns. Actions arrive as free-form
/// strings and confidence as whatever JSON value the model chose; all four
/// keys must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRecommendation {
    pub short_term: String,
    pub long_term: String,
    pub confidence: Value,
    pub reason: String,
}

impl LlmRecommendation {
    pub fn validate_and_into_recommendation(self) -> anyhow::Result<Recommendation> {
        let short_term: Action = self.short_term.parse()?;
        let long_term: Action = self.long_term.parse()?;

        let confidence = coerce_confidence(&self.confidence)?;
        ensure!(
            (0.0..=1.0).contains(&confidence),
            "confidence must be between 0 and 1 (got {confidence})"
        );

        Ok(Recommendation {
            short_term,
            long_term,
            confidence,
            reason: self.reason.trim().to_string(),
        })
    }
}

// Models frequently quote the number, so accept both 0.8 and "0.8".
fn coerce_confidence(value: &Value) -> anyhow::Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("confidence is not representable as f64: {n}")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow::anyhow!("confidence is not numeric: {s:?}")),
        other => anyhow::bail!("confidence has unexpected type: {other}"),
    }
}
