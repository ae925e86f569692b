use crate::domain::series::{PricePoint, PriceSeries};
use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{Sqlite, Transaction};

pub async fn replace(
    tx: &mut Transaction<'static, Sqlite>,
    series: &[PriceSeries],
) -> anyhow::Result<u64> {
    sqlx::query("DROP TABLE IF EXISTS market_data")
        .execute(&mut **tx)
        .await
        .context("drop market_data failed")?;
    sqlx::query(
        "CREATE TABLE market_data ( \
           date TEXT NOT NULL, \
           symbol TEXT NOT NULL, \
           close REAL NOT NULL, \
           PRIMARY KEY (symbol, date) \
         )",
    )
    .execute(&mut **tx)
    .await
    .context("create market_data failed")?;

    let mut inserted: u64 = 0;
    for s in series {
        for p in &s.points {
            let res = sqlx::query("INSERT INTO market_data (date, symbol, close) VALUES (?, ?, ?)")
                .bind(p.date)
                .bind(&s.symbol)
                .bind(p.close)
                .execute(&mut **tx)
                .await
                .context("insert market_data failed")?;
            inserted += res.rows_affected();
        }
    }

    Ok(inserted)
}

pub async fn load_points(
    tx: &mut Transaction<'static, Sqlite>,
    symbol: &str,
) -> anyhow::Result<Vec<PricePoint>> {
    let rows = sqlx::query_as::<_, (NaiveDate, f64)>(
        "SELECT date, close FROM market_data WHERE symbol = ? ORDER BY date",
    )
    .bind(symbol)
    .fetch_all(&mut **tx)
    .await
    .context("select market_data failed")?;

    Ok(rows
        .into_iter()
        .map(|(date, close)| PricePoint { date, close })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    fn series() -> PriceSeries {
        let points = vec![
            PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                close: 185.0,
            },
            PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                close: 186.5,
            },
        ];
        PriceSeries::try_new("AAPL".to_string(), points).unwrap()
    }

    #[tokio::test]
    async fn replace_then_load_round_trips() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let mut tx = pool.begin().await.unwrap();
        let inserted = replace(&mut tx, &[series()]).await.unwrap();
        assert_eq!(inserted, 2);

        let points = load_points(&mut tx, "AAPL").await.unwrap();
        assert_eq!(points, series().points);

        let none = load_points(&mut tx, "TSLA").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn replace_discards_previous_contents() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let mut tx = pool.begin().await.unwrap();
        replace(&mut tx, &[series()]).await.unwrap();

        let other = PriceSeries::try_new(
            "MSFT".to_string(),
            vec![PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                close: 370.0,
            }],
        )
        .unwrap();
        replace(&mut tx, &[other]).await.unwrap();

        assert!(load_points(&mut tx, "AAPL").await.unwrap().is_empty());
        assert_eq!(load_points(&mut tx, "MSFT").await.unwrap().len(), 1);
    }
}
