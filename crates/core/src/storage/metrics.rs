use anyhow::Context;

use crate::domain::market::MarketMetricSample;
use crate::storage::RunRecord;

pub async fn record_metric(
    pool: &sqlx::PgPool,
    sample: &MarketMetricSample,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO market_metrics (ts, metric_type, symbol, value, change_pct, extra) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(sample.ts)
    .bind(&sample.metric_type)
    .bind(&sample.symbol)
    .bind(sample.value)
    .bind(sample.change_pct)
    .bind(&sample.extra)
    .execute(pool)
    .await
    .context("insert market_metrics failed")?;
    Ok(())
}

pub async fn record_run(pool: &sqlx::PgPool, run: &RunRecord) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO pipeline_runs (id, started_at, finished_at, status, articles_seen, articles_processed, error) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(run.id)
    .bind(run.started_at)
    .bind(run.finished_at)
    .bind(&run.status)
    .bind(run.articles_seen)
    .bind(run.articles_processed)
    .bind(&run.error)
    .execute(pool)
    .await
    .context("insert pipeline_runs failed")?;
    Ok(())
}
