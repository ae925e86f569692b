//! Durable projection of one pipeline run. Tables are dropped and recreated
//! inside the run transaction (no migrations, no incremental upsert); the
//! report table is cleared and re-inserted as a single row.

pub mod market_data;
pub mod report;
pub mod risk;
pub mod technical;
