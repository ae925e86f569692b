pub mod market_data;
pub mod report;
pub mod risk;
pub mod strategy;
pub mod technical;

use crate::domain::context::RunContext;
use crate::ingest::provider::MarketDataProvider;
use crate::llm::client::RecommendationClient;
use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

/// One pipeline step. Stages share the run transaction and the mutable run
/// context; they are executed strictly in order.
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        ctx: &mut RunContext,
    ) -> anyhow::Result<()>;
}

/// Fixed, ordered stage list over a shared store. Stateless between runs;
/// commit and rollback are observable only through store contents after
/// `run` returns.
pub struct Orchestrator {
    stages: Vec<Box<dyn Stage>>,
}

impl Orchestrator {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn with_default_stages(
        provider: Arc<dyn MarketDataProvider>,
        client: RecommendationClient,
    ) -> Self {
        Self::new(vec![
            Box::new(market_data::MarketDataStage::new(provider)),
            Box::new(technical::TechnicalAnalysisStage),
            Box::new(risk::RiskAnalysisStage),
            Box::new(strategy::StrategyStage::new(client)),
            Box::new(report::ReportStage),
        ])
    }

    /// Executes every stage inside a single transaction. All-or-nothing: the
    /// first stage error rolls the store back and aborts the run.
    pub async fn run(&self, pool: &SqlitePool, ctx: &mut RunContext) -> anyhow::Result<()> {
        let mut tx = pool.begin().await.context("begin transaction failed")?;

        for stage in &self.stages {
            tracing::info!(stage = stage.name(), run_id = %ctx.run_id, "stage starting");
            match stage.execute(&mut tx, ctx).await {
                Ok(()) => {}
                Err(err) => {
                    tx.rollback().await.ok();
                    tracing::error!(stage = stage.name(), run_id = %ctx.run_id, error = %err, "stage failed; run rolled back");
                    return Err(err.context(format!("stage {} failed", stage.name())));
                }
            }
        }

        tx.commit().await.context("commit transaction failed")?;
        tracing::info!(run_id = %ctx.run_id, "pipeline committed");
        Ok(())
    }
}
