pub mod articles;
pub mod metrics;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::domain::article::{QuarantineTrigger, ScoredArticle, StockImpact};
use crate::domain::market::MarketMetricSample;

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Result of the idempotent article insert. A conflict on the link key means
/// another writer got there first; callers treat it as "already processed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Inserted(i64),
    Duplicate,
}

/// Audit row for one poll cycle.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: uuid::Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: String,
    pub articles_seen: i32,
    pub articles_processed: i32,
    pub error: Option<String>,
}

/// Durable store seam. The Postgres implementation is [`PgStore`]; tests use
/// an in-memory double.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn article_exists(&self, link: &str) -> anyhow::Result<bool>;

    /// Persist a scored article with its impact records and quarantine entry
    /// as one logical unit: either all committed or none.
    async fn persist_article(
        &self,
        scored: &ScoredArticle,
        impacts: &[StockImpact],
        quarantine: Option<&QuarantineTrigger>,
    ) -> anyhow::Result<PersistOutcome>;

    async fn record_metric(&self, sample: &MarketMetricSample) -> anyhow::Result<()>;

    async fn record_run(&self, run: &RunRecord) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn article_exists(&self, link: &str) -> anyhow::Result<bool> {
        articles::exists(&self.pool, link).await
    }

    async fn persist_article(
        &self,
        scored: &ScoredArticle,
        impacts: &[StockImpact],
        quarantine: Option<&QuarantineTrigger>,
    ) -> anyhow::Result<PersistOutcome> {
        articles::persist_scored(&self.pool, scored, impacts, quarantine).await
    }

    async fn record_metric(&self, sample: &MarketMetricSample) -> anyhow::Result<()> {
        metrics::record_metric(&self.pool, sample).await
    }

    async fn record_run(&self, run: &RunRecord) -> anyhow::Result<()> {
        metrics::record_run(&self.pool, run).await
    }
}
