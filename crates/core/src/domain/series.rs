use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered-by-date closing prices for one symbol. Missing trading days are
/// simply absent; every stored close is positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn try_new(symbol: String, points: Vec<PricePoint>) -> anyhow::Result<Self> {
        ensure!(!symbol.trim().is_empty(), "symbol must be non-empty");

        for pair in points.windows(2) {
            ensure!(
                pair[0].date < pair[1].date,
                "price series for {symbol} is not strictly increasing by date ({} then {})",
                pair[0].date,
                pair[1].date
            );
        }

        for p in &points {
            ensure!(
                p.close > 0.0,
                "price series for {symbol} has non-positive close {} on {}",
                p.close,
                p.date
            );
        }

        Ok(Self { symbol, points })
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

/// Per-date indicator row. Leading values are `None` while the rolling window
/// lacks history; that is defined behavior, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub rsi14: Option<f64>,
    pub volatility20: Option<f64>,
}

/// Whole-series risk metrics, one row per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub symbol: String,
    pub annual_volatility: Option<f64>,
    pub max_drawdown: Option<f64>,
}
