use advisor_core::config::Settings;
use advisor_core::domain::context::RunContext;
use advisor_core::ingest::provider::HttpJsonMarketData;
use advisor_core::llm::client::RecommendationClient;
use advisor_core::llm::ollama::OllamaClient;
use advisor_core::pipeline::Orchestrator;
use anyhow::Context;
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "advisor_cli")]
struct Args {
    /// Instrument symbols to analyze.
    #[arg(long, num_args = 1.., required = true)]
    symbols: Vec<String>,

    /// Trailing window of history, in calendar days ending today.
    #[arg(long, default_value_t = 365)]
    days: u32,

    /// SQLite database path. Overrides ADVISOR_DB_PATH.
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let end_date = chrono::Utc::now().date_naive();
    let start_date = end_date - chrono::Duration::days(i64::from(args.days));

    let db_path = args
        .db
        .as_deref()
        .unwrap_or_else(|| settings.db_path())
        .to_string();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(&db_path)
                .create_if_missing(true),
        )
        .await
        .with_context(|| format!("failed to open SQLite database at {db_path}"))?;

    let provider = HttpJsonMarketData::from_settings(&settings)?;
    let generator = OllamaClient::from_settings(&settings)?;
    let client = RecommendationClient::new(Arc::new(generator));
    let orchestrator = Orchestrator::with_default_stages(Arc::new(provider), client);

    let mut ctx = RunContext::new(args.symbols, start_date, end_date)?;
    tracing::info!(run_id = %ctx.run_id, %start_date, %end_date, db = %db_path, "pipeline starting");

    if let Err(err) = orchestrator.run(&pool, &mut ctx).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(run_id = %ctx.run_id, error = %err, "pipeline failed");
        return Err(err);
    }

    let report = ctx
        .report_text
        .context("pipeline committed without a report")?;
    println!("{report}");

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
