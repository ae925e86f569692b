use crate::domain::recommendation::Recommendation;
use anyhow::ensure;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Mutable state threaded through one pipeline execution. Owned exclusively
/// by a single run; the run id is generated once at construction.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub run_id: Uuid,
    pub strategies: BTreeMap<String, Recommendation>,
    pub report_text: Option<String>,
}

impl RunContext {
    pub fn new(
        symbols: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<Self> {
        ensure!(!symbols.is_empty(), "at least one symbol is required");
        ensure!(
            start_date < end_date,
            "start_date {start_date} must precede end_date {end_date}"
        );

        let mut seen = BTreeSet::new();
        for symbol in &symbols {
            ensure!(!symbol.trim().is_empty(), "symbols must be non-empty");
            ensure!(seen.insert(symbol.as_str()), "duplicate symbol: {symbol}");
        }

        Ok(Self {
            symbols,
            start_date,
            end_date,
            run_id: Uuid::new_v4(),
            strategies: BTreeMap::new(),
            report_text: None,
        })
    }
}
