use crate::domain::context::RunContext;
use crate::pipeline::Stage;
use crate::storage;
use anyhow::ensure;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};

const REPORT_TITLE: &str = "LLM FINANCIAL ADVISOR REPORT";
const RULE_WIDTH: usize = 40;

/// Deterministic given the strategies, the run id, and the injected
/// timestamp.
pub fn render(ctx: &RunContext, generated_at: DateTime<Utc>) -> String {
    let mut out = format!(
        "{REPORT_TITLE}\nRun ID: {}\nGenerated: {}\n\n",
        ctx.run_id,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    for (symbol, rec) in &ctx.strategies {
        out.push_str(&format!(
            "Symbol: {symbol}\n\
             Short Term: {}\n\
             Long Term: {}\n\
             Confidence: {:.2}\n\
             Reason: {}\n\
             {}\n",
            rec.short_term,
            rec.long_term,
            rec.confidence,
            rec.reason,
            "-".repeat(RULE_WIDTH),
        ));
    }

    out
}

/// Renders the final report, stores it as the single `report` row, and keeps
/// a copy on the context for immediate display.
pub struct ReportStage;

#[async_trait::async_trait]
impl Stage for ReportStage {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn execute(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        ctx: &mut RunContext,
    ) -> anyhow::Result<()> {
        ensure!(
            !ctx.strategies.is_empty(),
            "no strategies to report; strategy stage must run first"
        );

        let text = render(ctx, Utc::now());
        storage::report::save(tx, &text).await?;
        ctx.report_text = Some(text);

        tracing::info!(run_id = %ctx.run_id, "report stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::{Action, Recommendation};
    use chrono::{NaiveDate, TimeZone};

    fn context_with_strategies() -> RunContext {
        let mut ctx = RunContext::new(
            vec!["AAPL".to_string(), "MSFT".to_string()],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap();

        ctx.strategies.insert(
            "AAPL".to_string(),
            Recommendation {
                short_term: Action::Buy,
                long_term: Action::Hold,
                confidence: 0.8,
                reason: "momentum above both moving averages".to_string(),
            },
        );
        ctx.strategies
            .insert("MSFT".to_string(), Recommendation::fallback());
        ctx
    }

    // Pull one symbol's block back out of the rendered text.
    fn parse_block(report: &str, symbol: &str) -> Recommendation {
        let marker = format!("Symbol: {symbol}\n");
        let start = report.find(&marker).expect("symbol block present");
        let block = &report[start..];

        let field = |prefix: &str| -> String {
            block
                .lines()
                .find_map(|l| l.strip_prefix(prefix))
                .unwrap_or_else(|| panic!("line {prefix:?} present"))
                .to_string()
        };

        Recommendation {
            short_term: field("Short Term: ").parse().unwrap(),
            long_term: field("Long Term: ").parse().unwrap(),
            confidence: field("Confidence: ").parse().unwrap(),
            reason: field("Reason: "),
        }
    }

    #[test]
    fn render_round_trips_per_symbol_blocks() {
        let ctx = context_with_strategies();
        let generated_at = Utc.with_ymd_and_hms(2024, 6, 28, 17, 0, 0).unwrap();
        let report = render(&ctx, generated_at);

        assert!(report.starts_with(REPORT_TITLE));
        assert!(report.contains(&format!("Run ID: {}", ctx.run_id)));
        assert!(report.contains("Generated: 2024-06-28 17:00:00 UTC"));

        let aapl = parse_block(&report, "AAPL");
        assert_eq!(aapl, ctx.strategies["AAPL"]);

        // The degraded symbol stays visible, marked by the fallback reason.
        let msft = parse_block(&report, "MSFT");
        assert!(msft.is_fallback());
    }

    #[test]
    fn render_is_deterministic() {
        let ctx = context_with_strategies();
        let generated_at = Utc.with_ymd_and_hms(2024, 6, 28, 17, 0, 0).unwrap();
        assert_eq!(render(&ctx, generated_at), render(&ctx, generated_at));
    }

    #[test]
    fn confidence_is_two_decimal_places() {
        let mut ctx = context_with_strategies();
        ctx.strategies.get_mut("AAPL").unwrap().confidence = 0.8001;
        let report = render(&ctx, Utc.with_ymd_and_hms(2024, 6, 28, 17, 0, 0).unwrap());
        assert!(report.contains("Confidence: 0.80"));

        let rule: Vec<&str> = report
            .lines()
            .filter(|l| l.chars().all(|c| c == '-') && !l.is_empty())
            .collect();
        assert_eq!(rule.len(), 2);
        assert!(rule.iter().all(|l| l.len() == RULE_WIDTH));
    }
}
