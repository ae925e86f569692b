use crate::domain::series::TechnicalRecord;
use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{Sqlite, Transaction};

pub async fn replace(
    tx: &mut Transaction<'static, Sqlite>,
    records: &[TechnicalRecord],
) -> anyhow::Result<u64> {
    sqlx::query("DROP TABLE IF EXISTS technical_analysis")
        .execute(&mut **tx)
        .await
        .context("drop technical_analysis failed")?;
    sqlx::query(
        "CREATE TABLE technical_analysis ( \
           symbol TEXT NOT NULL, \
           date TEXT NOT NULL, \
           close REAL NOT NULL, \
           sma20 REAL, \
           sma50 REAL, \
           rsi14 REAL, \
           volatility20 REAL, \
           PRIMARY KEY (symbol, date) \
         )",
    )
    .execute(&mut **tx)
    .await
    .context("create technical_analysis failed")?;

    let mut inserted: u64 = 0;
    for r in records {
        let res = sqlx::query(
            "INSERT INTO technical_analysis \
               (symbol, date, close, sma20, sma50, rsi14, volatility20) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&r.symbol)
        .bind(r.date)
        .bind(r.close)
        .bind(r.sma20)
        .bind(r.sma50)
        .bind(r.rsi14)
        .bind(r.volatility20)
        .execute(&mut **tx)
        .await
        .context("insert technical_analysis failed")?;
        inserted += res.rows_affected();
    }

    Ok(inserted)
}

pub async fn load_closes(
    tx: &mut Transaction<'static, Sqlite>,
    symbol: &str,
) -> anyhow::Result<Vec<f64>> {
    sqlx::query_scalar::<_, f64>(
        "SELECT close FROM technical_analysis WHERE symbol = ? ORDER BY date",
    )
    .bind(symbol)
    .fetch_all(&mut **tx)
    .await
    .context("select technical_analysis closes failed")
}

type TechnicalRow = (
    NaiveDate,
    f64,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

pub async fn latest(
    tx: &mut Transaction<'static, Sqlite>,
    symbol: &str,
) -> anyhow::Result<Option<TechnicalRecord>> {
    let row = sqlx::query_as::<_, TechnicalRow>(
        "SELECT date, close, sma20, sma50, rsi14, volatility20 \
         FROM technical_analysis WHERE symbol = ? ORDER BY date DESC LIMIT 1",
    )
    .bind(symbol)
    .fetch_optional(&mut **tx)
    .await
    .context("select latest technical_analysis row failed")?;

    Ok(row.map(
        |(date, close, sma20, sma50, rsi14, volatility20)| TechnicalRecord {
            symbol: symbol.to_string(),
            date,
            close,
            sma20,
            sma50,
            rsi14,
            volatility20,
        },
    ))
}
