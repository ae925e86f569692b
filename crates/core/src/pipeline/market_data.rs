use crate::domain::context::RunContext;
use crate::ingest::provider::MarketDataProvider;
use crate::pipeline::Stage;
use crate::storage;
use anyhow::Context;
use sqlx::{Sqlite, Transaction};
use std::sync::Arc;

/// Fetches raw price history for the run's symbols and persists it as the
/// long-form `market_data` table.
pub struct MarketDataStage {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketDataStage {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Stage for MarketDataStage {
    fn name(&self) -> &'static str {
        "market_data"
    }

    async fn execute(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        ctx: &mut RunContext,
    ) -> anyhow::Result<()> {
        let resp = self
            .provider
            .fetch_daily_closes(&ctx.symbols, ctx.start_date, ctx.end_date)
            .await
            .with_context(|| format!("market data fetch failed ({})", self.provider.provider_name()))?;

        let mut series = Vec::with_capacity(ctx.symbols.len());
        for symbol in &ctx.symbols {
            series.push(resp.series_for(symbol)?);
        }

        let rows = storage::market_data::replace(tx, &series).await?;
        tracing::info!(rows, symbols = ctx.symbols.len(), "market data stored");
        Ok(())
    }
}
