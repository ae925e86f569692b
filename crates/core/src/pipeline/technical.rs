use crate::domain::context::RunContext;
use crate::domain::indicators;
use crate::domain::series::PriceSeries;
use crate::pipeline::Stage;
use crate::storage;
use anyhow::ensure;
use sqlx::{Sqlite, Transaction};

/// Computes sma20/sma50/rsi14/volatility20 per symbol from the stored price
/// history and replaces the `technical_analysis` table.
pub struct TechnicalAnalysisStage;

#[async_trait::async_trait]
impl Stage for TechnicalAnalysisStage {
    fn name(&self) -> &'static str {
        "technical_analysis"
    }

    async fn execute(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        ctx: &mut RunContext,
    ) -> anyhow::Result<()> {
        let mut records = Vec::new();
        for symbol in &ctx.symbols {
            let points = storage::market_data::load_points(tx, symbol).await?;
            ensure!(!points.is_empty(), "no market data rows for {symbol}");

            let series = PriceSeries::try_new(symbol.clone(), points)?;
            records.extend(indicators::compute_technical(&series));
        }

        let rows = storage::technical::replace(tx, &records).await?;
        tracing::info!(rows, "technical analysis stored");
        Ok(())
    }
}
