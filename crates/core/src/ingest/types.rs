use crate::domain::series::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wide daily-closes table as the provider returns it: one row per trading
/// date, one price column per symbol (`Close_<Symbol>`; bare `Close` when a
/// single symbol was requested). A null cell means the day is absent for that
/// symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyClosesResponse {
    pub rows: Vec<DailyCloseRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCloseRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub closes: BTreeMap<String, Option<f64>>,
}

impl DailyCloseRow {
    pub fn close_for(&self, symbol: &str) -> Option<f64> {
        let prefixed = format!("Close_{symbol}");
        self.closes
            .get(&prefixed)
            .copied()
            .flatten()
            .or_else(|| self.closes.get("Close").copied().flatten())
    }
}

impl DailyClosesResponse {
    /// Narrow the wide table to one symbol's series, skipping absent days.
    pub fn series_for(&self, symbol: &str) -> anyhow::Result<PriceSeries> {
        let points: Vec<PricePoint> = self
            .rows
            .iter()
            .filter_map(|row| {
                row.close_for(symbol).map(|close| PricePoint {
                    date: row.date,
                    close,
                })
            })
            .collect();

        anyhow::ensure!(!points.is_empty(), "no price history for symbol {symbol}");
        PriceSeries::try_new(symbol.to_string(), points)
    }
}
