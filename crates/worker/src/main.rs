use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use macrowire_core::config::{PipelineConfig, Settings};
use macrowire_core::ingest::{self, ArticleSource};
use macrowire_core::ingest::rss::RssFeedSource;
use macrowire_core::ingest::social::SocialPostSource;
use macrowire_core::market::crypto::CoinGeckoProvider;
use macrowire_core::market::quotes::ChartQuoteProvider;
use macrowire_core::pipeline::BatchProcessor;
use macrowire_core::recorder::MarketMetricsRecorder;
use macrowire_core::storage::{self, PgStore, RunRecord, Store};

#[derive(Debug, Parser)]
#[command(name = "macrowire_worker")]
struct Args {
    /// Run a single poll cycle and exit.
    #[arg(long)]
    once: bool,

    /// Fetch from every source but skip the pipeline and all database writes.
    #[arg(long)]
    dry_run: bool,
}

struct Worker {
    cfg: PipelineConfig,
    store: PgStore,
    sources: Vec<Box<dyn ArticleSource>>,
    quotes: ChartQuoteProvider,
    crypto: CoinGeckoProvider,
    processor: BatchProcessor,
    recorder: MarketMetricsRecorder,
}

#[derive(Debug, Clone, Copy)]
struct CycleSummary {
    seen: usize,
    processed: usize,
    skipped: usize,
    failed: usize,
    metric_samples: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let cfg = PipelineConfig::from_env();

    let quotes = ChartQuoteProvider::new(settings.quote_api_base_url.as_deref())?;
    let crypto = CoinGeckoProvider::new(settings.crypto_api_base_url.as_deref())?;
    let sources = build_sources(&cfg)?;

    if args.dry_run {
        let articles = ingest::collect_articles(&sources).await;
        let recorder = MarketMetricsRecorder::new(&cfg);
        let samples = recorder.collect(&quotes, &crypto).await;
        tracing::info!(
            dry_run = true,
            articles = articles.len(),
            metric_samples = samples.len(),
            "dry-run cycle complete"
        );
        return Ok(());
    }

    let db_url = settings.require_database_url()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    storage::migrate(&pool).await?;

    let worker = Worker {
        processor: BatchProcessor::new(&cfg),
        recorder: MarketMetricsRecorder::new(&cfg),
        store: PgStore::new(pool),
        sources,
        quotes,
        crypto,
        cfg,
    };

    tracing::info!(
        interval_secs = worker.cfg.loop_interval_secs,
        feeds = worker.cfg.news_feeds.len(),
        basket = worker.cfg.stock_symbols.len(),
        "macrowire worker started"
    );

    run_loop(&worker, &args).await
}

fn build_sources(cfg: &PipelineConfig) -> anyhow::Result<Vec<Box<dyn ArticleSource>>> {
    let mut sources: Vec<Box<dyn ArticleSource>> = Vec::new();
    for url in &cfg.news_feeds {
        sources.push(Box::new(RssFeedSource::new(url)?));
    }
    sources.push(Box::new(SocialPostSource::new(cfg)?));
    Ok(sources)
}

/// The control loop: one cycle per interval, 30s backoff after a failed
/// cycle, external shutdown only.
async fn run_loop(worker: &Worker, args: &Args) -> anyhow::Result<()> {
    let interval = Duration::from_secs(worker.cfg.loop_interval_secs);
    let backoff = Duration::from_secs(worker.cfg.error_backoff_secs);

    loop {
        let started = Instant::now();
        let started_at = chrono::Utc::now();
        let run_id = uuid::Uuid::new_v4();

        match run_cycle(worker).await {
            Ok(summary) => {
                let run = RunRecord {
                    id: run_id,
                    started_at,
                    finished_at: chrono::Utc::now(),
                    status: "success".to_string(),
                    articles_seen: summary.seen as i32,
                    articles_processed: summary.processed as i32,
                    error: None,
                };
                if let Err(err) = worker.store.record_run(&run).await {
                    tracing::warn!(error = %err, "failed to record run");
                }

                tracing::info!(
                    %run_id,
                    seen = summary.seen,
                    processed = summary.processed,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    metric_samples = summary.metric_samples,
                    elapsed_ms = started.elapsed().as_millis(),
                    "cycle complete"
                );
            }
            Err(err) => {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(%run_id, error = %err, "cycle failed");

                let run = RunRecord {
                    id: run_id,
                    started_at,
                    finished_at: chrono::Utc::now(),
                    status: "error".to_string(),
                    articles_seen: 0,
                    articles_processed: 0,
                    error: Some(format!("{err:#}")),
                };
                if let Err(err) = worker.store.record_run(&run).await {
                    tracing::warn!(error = %err, "failed to record run");
                }

                if args.once {
                    return Err(err);
                }
                tokio::time::sleep(backoff).await;
                continue;
            }
        }

        if args.once {
            return Ok(());
        }

        tokio::time::sleep(interval.saturating_sub(started.elapsed())).await;
    }
}

async fn run_cycle(worker: &Worker) -> anyhow::Result<CycleSummary> {
    let articles = ingest::collect_articles(&worker.sources).await;

    let batch = worker
        .processor
        .process_batch(&worker.store, &worker.quotes, &articles)
        .await;

    let metric_samples = worker
        .recorder
        .record(&worker.store, &worker.quotes, &worker.crypto)
        .await?;

    Ok(CycleSummary {
        seen: batch.seen,
        processed: batch.processed,
        skipped: batch.skipped,
        failed: batch.failed,
        metric_samples,
    })
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
