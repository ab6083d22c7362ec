use anyhow::Context;
use chrono::Utc;

use crate::domain::article::{QuarantineTrigger, ScoredArticle, StockImpact};
use crate::storage::PersistOutcome;

pub async fn exists(pool: &sqlx::PgPool, link: &str) -> anyhow::Result<bool> {
    let found: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM news WHERE link = $1)")
        .bind(link)
        .fetch_one(pool)
        .await
        .context("news existence check failed")?;
    Ok(found.0)
}

/// Insert the scored article plus its stock-impact rows and quarantine entry
/// in one transaction. The link-uniqueness constraint makes the insert
/// race-free: a conflicting concurrent insert resolves to `Duplicate`, and
/// the dependent rows are never written without their article.
pub async fn persist_scored(
    pool: &sqlx::PgPool,
    scored: &ScoredArticle,
    impacts: &[StockImpact],
    quarantine: Option<&QuarantineTrigger>,
) -> anyhow::Result<PersistOutcome> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let art = &scored.article;
    let news_id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO news (title, summary, link, pub_date, source, sentiment, impact_score, macro_score, processed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (link) DO NOTHING \
         RETURNING id",
    )
    .bind(&art.title)
    .bind(&art.summary)
    .bind(&art.link)
    .bind(art.pub_date)
    .bind(&art.source)
    .bind(scored.sentiment)
    .bind(scored.impact_score)
    .bind(scored.macro_score)
    .bind(scored.processed_at)
    .fetch_optional(&mut *tx)
    .await
    .context("insert news failed")?;

    let Some(news_id) = news_id else {
        return Ok(PersistOutcome::Duplicate);
    };

    for impact in impacts {
        sqlx::query(
            "INSERT INTO stock_impact (news_id, symbol, price_change, volume_spike) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(news_id)
        .bind(&impact.symbol)
        .bind(impact.price_change)
        .bind(impact.volume_spike)
        .execute(&mut *tx)
        .await
        .context("insert stock_impact failed")?;
    }

    if let Some(trigger) = quarantine {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO macro_quarantine (news_id, trigger, tracked_since, last_update) \
             VALUES ($1, $2, $3, $3) \
             ON CONFLICT (news_id) DO NOTHING",
        )
        .bind(news_id)
        .bind(trigger.as_tag())
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("insert macro_quarantine failed")?;
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(PersistOutcome::Inserted(news_id))
}
