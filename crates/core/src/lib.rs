pub mod domain;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub advisor_db_path: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_api_key: Option<String>,
        pub ollama_base_url: Option<String>,
        pub ollama_model: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                advisor_db_path: std::env::var("ADVISOR_DB_PATH").ok(),
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                market_data_api_key: std::env::var("MARKET_DATA_API_KEY").ok(),
                ollama_base_url: std::env::var("OLLAMA_BASE_URL").ok(),
                ollama_model: std::env::var("OLLAMA_MODEL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_market_data_base_url(&self) -> anyhow::Result<&str> {
            self.market_data_base_url
                .as_deref()
                .context("MARKET_DATA_BASE_URL is required")
        }

        pub fn db_path(&self) -> &str {
            self.advisor_db_path.as_deref().unwrap_or("advisor.db")
        }
    }
}
