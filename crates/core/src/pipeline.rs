//! Ingestion batch processor: dedup -> analyze -> score -> correlate ->
//! quarantine -> persist, article by article.

use anyhow::Result;
use chrono::Utc;

use crate::analyze::TextAnalyzer;
use crate::config::PipelineConfig;
use crate::correlate::StockImpactCorrelator;
use crate::domain::article::{Article, Priority, ScoredArticle};
use crate::market::quotes::QuoteProvider;
use crate::quarantine::QuarantinePolicy;
use crate::score::ImpactScorer;
use crate::storage::{PersistOutcome, Store};

const LOG_TITLE_CHARS: usize = 70;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub seen: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct BatchProcessor {
    cfg: PipelineConfig,
    analyzer: TextAnalyzer,
    scorer: ImpactScorer,
    quarantine: QuarantinePolicy,
    correlator: StockImpactCorrelator,
}

impl BatchProcessor {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            analyzer: TextAnalyzer::new(cfg),
            scorer: ImpactScorer::new(cfg),
            quarantine: QuarantinePolicy::new(cfg),
            correlator: StockImpactCorrelator::new(cfg),
        }
    }

    /// Process a batch of freshly fetched articles. Order is not significant.
    /// A failure on one article never aborts the rest of the batch.
    pub async fn process_batch(
        &self,
        store: &dyn Store,
        quotes: &dyn QuoteProvider,
        articles: &[Article],
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            seen: articles.len(),
            ..Default::default()
        };

        for article in articles {
            match self.process_one(store, quotes, article).await {
                Ok(true) => outcome.processed += 1,
                Ok(false) => outcome.skipped += 1,
                Err(err) => {
                    outcome.failed += 1;
                    tracing::error!(link = %article.link, error = %err, "article processing failed");
                }
            }
        }

        outcome
    }

    /// Returns Ok(true) if the article was newly persisted, Ok(false) if it
    /// was already known (dedup gate or insert conflict).
    async fn process_one(
        &self,
        store: &dyn Store,
        quotes: &dyn QuoteProvider,
        article: &Article,
    ) -> Result<bool> {
        if store.article_exists(&article.link).await? {
            return Ok(false);
        }

        let full_text = article.full_text();
        let sentiment = self.analyzer.sentiment(&full_text);
        let macro_score = self.analyzer.macro_score(&full_text);
        let impact_score =
            self.scorer
                .compute_impact(article, &self.analyzer, sentiment, macro_score);

        let scored = ScoredArticle {
            article: article.clone(),
            sentiment,
            macro_score,
            impact_score,
            processed_at: Utc::now(),
        };

        let impacts = if impact_score > self.cfg.impact_threshold {
            self.correlator.correlate(quotes).await
        } else {
            Vec::new()
        };

        let trigger = self.quarantine.evaluate(article, &self.analyzer, macro_score);

        let outcome = store
            .persist_article(&scored, &impacts, trigger.as_ref())
            .await?;
        if outcome == PersistOutcome::Duplicate {
            // Concurrent writer won the race; already processed.
            return Ok(false);
        }

        let title: String = article.title.chars().take(LOG_TITLE_CHARS).collect();
        tracing::info!(
            priority = Priority::from_impact(impact_score).as_str(),
            title = %title,
            impact = impact_score,
            macro_score,
            sentiment,
            source = %article.source,
            impacts = impacts.len(),
            quarantined = trigger.is_some(),
            "article processed"
        );

        Ok(true)
    }
}
