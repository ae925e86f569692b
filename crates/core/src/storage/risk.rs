use crate::domain::series::RiskRecord;
use anyhow::Context;
use sqlx::{Sqlite, Transaction};

pub async fn replace(
    tx: &mut Transaction<'static, Sqlite>,
    records: &[RiskRecord],
) -> anyhow::Result<u64> {
    sqlx::query("DROP TABLE IF EXISTS risk_analysis")
        .execute(&mut **tx)
        .await
        .context("drop risk_analysis failed")?;
    sqlx::query(
        "CREATE TABLE risk_analysis ( \
           symbol TEXT NOT NULL PRIMARY KEY, \
           annual_volatility REAL, \
           max_drawdown REAL \
         )",
    )
    .execute(&mut **tx)
    .await
    .context("create risk_analysis failed")?;

    let mut inserted: u64 = 0;
    for r in records {
        let res = sqlx::query(
            "INSERT INTO risk_analysis (symbol, annual_volatility, max_drawdown) VALUES (?, ?, ?)",
        )
        .bind(&r.symbol)
        .bind(r.annual_volatility)
        .bind(r.max_drawdown)
        .execute(&mut **tx)
        .await
        .context("insert risk_analysis failed")?;
        inserted += res.rows_affected();
    }

    Ok(inserted)
}

pub async fn load(
    tx: &mut Transaction<'static, Sqlite>,
    symbol: &str,
) -> anyhow::Result<Option<RiskRecord>> {
    let row = sqlx::query_as::<_, (Option<f64>, Option<f64>)>(
        "SELECT annual_volatility, max_drawdown FROM risk_analysis WHERE symbol = ?",
    )
    .bind(symbol)
    .fetch_optional(&mut **tx)
    .await
    .context("select risk_analysis failed")?;

    Ok(row.map(|(annual_volatility, max_drawdown)| RiskRecord {
        symbol: symbol.to_string(),
        annual_volatility,
        max_drawdown,
    }))
}
