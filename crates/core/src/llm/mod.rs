pub mod client;
pub mod json;
pub mod ollama;

/// Seam for the external text-generation service. The pipeline only ever
/// needs a prompt in and raw text out; everything else (endpoint, envelope,
/// sampling options) stays behind the implementation.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
