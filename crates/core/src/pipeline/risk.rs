use crate::domain::context::RunContext;
use crate::domain::indicators;
use crate::pipeline::Stage;
use crate::storage;
use anyhow::ensure;
use sqlx::{Sqlite, Transaction};

/// Computes whole-series risk metrics per symbol and replaces the
/// `risk_analysis` table (one row per symbol).
pub struct RiskAnalysisStage;

#[async_trait::async_trait]
impl Stage for RiskAnalysisStage {
    fn name(&self) -> &'static str {
        "risk_analysis"
    }

    async fn execute(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        ctx: &mut RunContext,
    ) -> anyhow::Result<()> {
        let mut records = Vec::with_capacity(ctx.symbols.len());
        for symbol in &ctx.symbols {
            let closes = storage::technical::load_closes(tx, symbol).await?;
            ensure!(!closes.is_empty(), "no technical analysis rows for {symbol}");

            records.push(indicators::compute_risk(symbol, &closes));
        }

        let rows = storage::risk::replace(tx, &records).await?;
        tracing::info!(rows, "risk analysis stored");
        Ok(())
    }
}
