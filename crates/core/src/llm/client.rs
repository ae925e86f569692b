use crate::domain::recommendation::Recommendation;
use crate::domain::series::{RiskRecord, TechnicalRecord};
use crate::llm::{json, TextGenerator};
use std::sync::Arc;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY_SECS: u64 = 5;

/// Resilient wrapper around the text-generation service: bounded retries with
/// a fixed pause, then a fixed fallback. From the pipeline's perspective this
/// always succeeds.
#[derive(Clone)]
pub struct RecommendationClient {
    generator: Arc<dyn TextGenerator>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl RecommendationClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_attempts: MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(RETRY_DELAY_SECS),
        }
    }

    /// Override the inter-attempt pause; tests use zero to simulate failures
    /// without real waiting.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub async fn recommend(
        &self,
        symbol: &str,
        technical: &TechnicalRecord,
        risk: &RiskRecord,
    ) -> Recommendation {
        let prompt = build_prompt(symbol, technical, risk);

        let mut attempt: u32 = 0;
        let raw = loop {
            attempt += 1;
            match self.generator.generate(&prompt).await {
                Ok(text) => break Some(text),
                Err(err) => {
                    if attempt >= self.max_attempts {
                        tracing::warn!(
                            symbol,
                            attempts = attempt,
                            error = %err,
                            "text generation unreachable; using fallback recommendation"
                        );
                        break None;
                    }
                    tracing::warn!(symbol, attempt, error = %err, "text generation attempt failed; retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        };

        match raw {
            Some(text) => {
                tracing::debug!(symbol, raw = %text, "raw model output");
                json::parse_recommendation(&text)
            }
            None => Recommendation::fallback(),
        }
    }
}

fn build_prompt(symbol: &str, technical: &TechnicalRecord, risk: &RiskRecord) -> String {
    [
        "You are a cautious professional financial advisor.".to_string(),
        String::new(),
        format!("Symbol: {symbol}"),
        format!("Price: {}", fmt_value(Some(technical.close))),
        format!("SMA20: {}", fmt_value(technical.sma20)),
        format!("SMA50: {}", fmt_value(technical.sma50)),
        format!("RSI14: {}", fmt_value(technical.rsi14)),
        format!("Volatility: {}", fmt_value(technical.volatility20)),
        format!("Annual Risk: {}", fmt_value(risk.annual_volatility)),
        format!("Max Drawdown: {}", fmt_value(risk.max_drawdown)),
        String::new(),
        "Return ONLY a valid JSON object.".to_string(),
        "No markdown. No explanations.".to_string(),
        String::new(),
        "{".to_string(),
        "  \"short_term\": \"Buy | Sell | Hold\",".to_string(),
        "  \"long_term\": \"Buy | Sell | Hold\",".to_string(),
        "  \"confidence\": 0.0,".to_string(),
        "  \"reason\": \"one sentence explanation\"".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}
