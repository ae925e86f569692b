use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};

// Unlike the analysis tables, the report table is kept across runs; only its
// single row is swapped.
pub async fn save(tx: &mut Transaction<'static, Sqlite>, text: &str) -> anyhow::Result<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS report (text TEXT NOT NULL)")
        .execute(&mut **tx)
        .await
        .context("create report failed")?;
    sqlx::query("DELETE FROM report")
        .execute(&mut **tx)
        .await
        .context("clear report failed")?;
    sqlx::query("INSERT INTO report (text) VALUES (?)")
        .bind(text)
        .execute(&mut **tx)
        .await
        .context("insert report failed")?;
    Ok(())
}

pub async fn load(pool: &SqlitePool) -> anyhow::Result<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT text FROM report")
        .fetch_optional(pool)
        .await
        .context("select report failed")
}
