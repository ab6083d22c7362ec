use anyhow::Context;

/// Process-level settings sourced from the environment (secrets, endpoints).
/// Tunable pipeline policy lives in [`PipelineConfig`] instead.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub sentry_dsn: Option<String>,
    pub quote_api_base_url: Option<String>,
    pub crypto_api_base_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            quote_api_base_url: std::env::var("QUOTE_API_BASE_URL").ok(),
            crypto_api_base_url: std::env::var("CRYPTO_API_BASE_URL").ok(),
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL is required")
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(default)
}

/// Immutable pipeline policy, built once at startup and passed into each
/// component at construction. Keyword scans preserve list order: the first
/// matching macro keyword becomes the quarantine trigger.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub loop_interval_secs: u64,
    pub error_backoff_secs: u64,

    pub news_feeds: Vec<String>,

    /// Correlation basket checked for anomalous reaction to high-impact articles.
    pub stock_symbols: Vec<String>,
    /// (metric key, quote symbol) pairs snapshotted each cycle.
    pub index_symbols: Vec<(String, String)>,
    pub currency_pairs: Vec<String>,
    /// (ticker, provider coin id) pairs.
    pub crypto_coins: Vec<(String, String)>,

    pub macro_keywords: Vec<String>,
    pub fiscal_keywords: Vec<String>,

    /// The designated ultra-priority source: articles whose source name contains
    /// `ultra_source_marker` get the fixed fiscal boost and the sentinel
    /// quarantine rule. Policy choice carried over as configurable, not hard-coded.
    pub ultra_source_url: String,
    pub ultra_source_name: String,
    pub ultra_source_marker: String,

    pub impact_threshold: f64,
    pub quarantine_threshold: f64,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            loop_interval_secs: env_u64("LOOP_INTERVAL_SECS", 300),
            error_backoff_secs: env_u64("ERROR_BACKOFF_SECS", 30),
            impact_threshold: env_f64("IMPACT_THRESHOLD", 0.6),
            quarantine_threshold: env_f64("MACRO_QUARANTINE_THRESHOLD", 0.8),
            ..Self::default()
        }
    }

    pub fn is_ultra_source(&self, source: &str) -> bool {
        source.contains(self.ultra_source_marker.as_str())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        fn strings(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            loop_interval_secs: 300,
            error_backoff_secs: 30,
            news_feeds: strings(&[
                "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml",
                "https://feeds.reuters.com/reuters/businessNews",
                "https://www.cnbc.com/id/100003114/device/rss/rss.html",
                "https://finance.yahoo.com/news/rssindex",
            ]),
            stock_symbols: strings(&["SPY", "QQQ", "DIA", "IWM", "TLT", "GLD", "VIX"]),
            index_symbols: [
                ("SP_FUTURES", "ES=F"),
                ("SP_INDEX", "^GSPC"),
                ("NASDAQ", "^IXIC"),
                ("GOLD", "GC=F"),
                ("VIX", "^VIX"),
                ("ASIAN_SP", "^N225"),
                ("EURO_SP", "^STOXX50E"),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            currency_pairs: strings(&["EURUSD=X", "USDJPY=X", "GBPUSD=X", "AUDUSD=X"]),
            crypto_coins: vec![
                ("BTC".to_string(), "bitcoin".to_string()),
                ("ETH".to_string(), "ethereum".to_string()),
            ],
            macro_keywords: strings(&[
                "fed",
                "fomc",
                "rate cut",
                "rate hike",
                "inflation",
                "cpi",
                "ppi",
                "jobs report",
                "nfp",
                "unemployment",
                "recession",
                "stagflation",
                "tariff",
                "trade war",
                "deficit",
                "debt ceiling",
                "shutdown",
            ]),
            fiscal_keywords: strings(&[
                "economy",
                "stock market",
                "tariffs",
                "trade",
                "fed",
                "rates",
                "inflation",
                "jobs",
                "deficit",
                "debt",
                "tax",
                "budget",
                "wall street",
                "dow",
                "nasdaq",
            ]),
            ultra_source_url: "https://truthsocial.com/@realDonaldTrump".to_string(),
            ultra_source_name: "Truth Social (@realDonaldTrump)".to_string(),
            ultra_source_marker: "Truth Social".to_string(),
            impact_threshold: 0.6,
            quarantine_threshold: 0.8,
        }
    }
}
