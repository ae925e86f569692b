use crate::domain::context::RunContext;
use crate::llm::client::RecommendationClient;
use crate::pipeline::Stage;
use crate::storage;
use anyhow::Context;
use sqlx::{Sqlite, Transaction};

/// Asks the recommendation client for a call per symbol, feeding it the
/// latest technical row and the symbol's risk row. Degraded recommendations
/// (fallbacks) are not failures; missing input rows are.
pub struct StrategyStage {
    client: RecommendationClient,
}

impl StrategyStage {
    pub fn new(client: RecommendationClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Stage for StrategyStage {
    fn name(&self) -> &'static str {
        "strategy"
    }

    async fn execute(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        ctx: &mut RunContext,
    ) -> anyhow::Result<()> {
        let symbols = ctx.symbols.clone();
        for symbol in &symbols {
            let technical = storage::technical::latest(tx, symbol)
                .await?
                .with_context(|| format!("no technical analysis rows for {symbol}"))?;
            let risk = storage::risk::load(tx, symbol)
                .await?
                .with_context(|| format!("no risk analysis row for {symbol}"))?;

            let recommendation = self.client.recommend(symbol, &technical, &risk).await;
            if recommendation.is_fallback() {
                tracing::warn!(symbol, "recommendation degraded to fallback");
            }
            ctx.strategies.insert(symbol.clone(), recommendation);
        }

        tracing::info!(run_id = %ctx.run_id, strategies = ctx.strategies.len(), "strategies generated");
        Ok(())
    }
}
