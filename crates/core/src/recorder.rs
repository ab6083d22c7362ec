//! Market metrics recorder: snapshots index/crypto/currency values each poll
//! cycle into the append-only time series. Independent of the article
//! pipeline; each metric source is best-effort and isolated.

use chrono::Utc;
use serde_json::json;

use crate::config::PipelineConfig;
use crate::domain::market::MarketMetricSample;
use crate::market::crypto::CryptoProvider;
use crate::market::quotes::QuoteProvider;
use crate::storage::Store;

pub struct MarketMetricsRecorder {
    cfg: PipelineConfig,
}

impl MarketMetricsRecorder {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Gather one sample per tracked key. A failing source logs a warning and
    /// contributes nothing; the other sources still report.
    pub async fn collect(
        &self,
        quotes: &dyn QuoteProvider,
        crypto: &dyn CryptoProvider,
    ) -> Vec<MarketMetricSample> {
        let now = Utc::now();
        let mut out = Vec::new();

        for (key, symbol) in &self.cfg.index_symbols {
            match quotes.quote(symbol).await {
                Ok(q) => {
                    let mut sample =
                        MarketMetricSample::new(now, "index", key).with_change(q.change_pct);
                    if let Some(price) = q.price {
                        sample = sample.with_value(price);
                    }
                    out.push(sample);
                }
                Err(err) => {
                    tracing::warn!(symbol = %symbol, error = %err, "index quote failed");
                }
            }
        }

        for pair in &self.cfg.currency_pairs {
            match quotes.quote(pair).await {
                // Flat pairs are omitted, matching the sparse currency series.
                Ok(q) if q.change_pct != 0.0 => {
                    out.push(
                        MarketMetricSample::new(now, "currency", &format!("curr_{pair}"))
                            .with_value(q.change_pct),
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(pair = %pair, error = %err, "currency quote failed");
                }
            }
        }

        self.collect_crypto(crypto, now, &mut out).await;
        out
    }

    async fn collect_crypto(
        &self,
        crypto: &dyn CryptoProvider,
        now: chrono::DateTime<Utc>,
        out: &mut Vec<MarketMetricSample>,
    ) {
        let ids: Vec<String> = self
            .cfg
            .crypto_coins
            .iter()
            .map(|(_, id)| id.clone())
            .collect();

        match crypto.price_and_change(&ids).await {
            Ok(prices) => {
                for (ticker, id) in &self.cfg.crypto_coins {
                    let Some(quote) = prices.get(id) else {
                        continue;
                    };
                    let mut sample = MarketMetricSample::new(now, "crypto", &format!("{ticker}_price"))
                        .with_change(quote.usd_24h_change.unwrap_or(0.0))
                        .with_extra(json!({ "coin_id": id }));
                    if let Some(price) = quote.usd_price {
                        sample = sample.with_value(price);
                    }
                    out.push(sample);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "crypto prices failed");
            }
        }

        match crypto.global_dominance().await {
            Ok(dominance) => {
                for (ticker, _) in &self.cfg.crypto_coins {
                    let key = ticker.to_lowercase();
                    if let Some(pct) = dominance.get(&key) {
                        out.push(
                            MarketMetricSample::new(now, "crypto", &format!("{key}_dominance"))
                                .with_value(*pct),
                        );
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "crypto dominance failed");
            }
        }

        for (ticker, id) in &self.cfg.crypto_coins {
            match crypto.supply_info(id).await {
                Ok(supply) => {
                    let key = ticker.to_lowercase();
                    if let Some(circulating) = supply.circulating {
                        out.push(
                            MarketMetricSample::new(now, "crypto", &format!("{key}_circ_supply"))
                                .with_value(circulating),
                        );
                    }
                    if let Some(total) = supply.total {
                        out.push(
                            MarketMetricSample::new(now, "crypto", &format!("{key}_total_supply"))
                                .with_value(total),
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(coin = %id, error = %err, "crypto supply failed");
                }
            }
        }
    }

    /// Collect and append; returns the number of samples written.
    pub async fn record(
        &self,
        store: &dyn Store,
        quotes: &dyn QuoteProvider,
        crypto: &dyn CryptoProvider,
    ) -> anyhow::Result<usize> {
        let samples = self.collect(quotes, crypto).await;
        for sample in &samples {
            store.record_metric(sample).await?;
        }
        log_snapshot(&samples);
        Ok(samples.len())
    }
}

fn trend_tag(change_pct: f64) -> &'static str {
    if change_pct > 0.0 {
        "[UP]"
    } else if change_pct < 0.0 {
        "[DOWN]"
    } else {
        "[FLAT]"
    }
}

/// Compact per-cycle snapshot in the logs.
pub fn log_snapshot(samples: &[MarketMetricSample]) {
    for s in samples {
        tracing::info!(
            metric = %s.symbol,
            kind = %s.metric_type,
            value = s.value,
            trend = trend_tag(s.change_pct),
            change_pct = s.change_pct,
            "snapshot"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use anyhow::Result;
    use crate::domain::market::{Candle, Quote};
    use crate::market::crypto::{CoinQuote, SupplyInfo};

    struct ScriptedQuotes {
        fail_symbols: Vec<String>,
    }

    #[async_trait::async_trait]
    impl QuoteProvider for ScriptedQuotes {
        async fn quote(&self, symbol: &str) -> Result<Quote> {
            if self.fail_symbols.iter().any(|s| s == symbol) {
                anyhow::bail!("scripted quote failure for {symbol}")
            }
            Ok(Quote {
                price: Some(100.0),
                change_pct: 1.5,
            })
        }

        async fn history(&self, _symbol: &str) -> Result<Vec<Candle>> {
            Ok(Vec::new())
        }
    }

    struct ScriptedCrypto {
        fail_prices: bool,
    }

    #[async_trait::async_trait]
    impl CryptoProvider for ScriptedCrypto {
        async fn price_and_change(&self, ids: &[String]) -> Result<HashMap<String, CoinQuote>> {
            if self.fail_prices {
                anyhow::bail!("scripted crypto failure")
            }
            Ok(ids
                .iter()
                .map(|id| {
                    (
                        id.clone(),
                        CoinQuote {
                            usd_price: Some(50_000.0),
                            usd_24h_change: Some(-2.0),
                        },
                    )
                })
                .collect())
        }

        async fn global_dominance(&self) -> Result<HashMap<String, f64>> {
            Ok([("btc".to_string(), 54.0), ("eth".to_string(), 13.0)]
                .into_iter()
                .collect())
        }

        async fn supply_info(&self, _id: &str) -> Result<SupplyInfo> {
            Ok(SupplyInfo {
                circulating: Some(120_000_000.0),
                total: None,
            })
        }
    }

    fn small_cfg() -> PipelineConfig {
        let mut cfg = PipelineConfig::default();
        cfg.index_symbols = vec![
            ("SP_INDEX".to_string(), "^GSPC".to_string()),
            ("VIX".to_string(), "^VIX".to_string()),
        ];
        cfg.currency_pairs = vec!["EURUSD=X".to_string()];
        cfg
    }

    #[tokio::test]
    async fn collects_one_sample_per_tracked_key() {
        let recorder = MarketMetricsRecorder::new(&small_cfg());
        let quotes = ScriptedQuotes {
            fail_symbols: vec![],
        };
        let crypto = ScriptedCrypto { fail_prices: false };

        let samples = recorder.collect(&quotes, &crypto).await;
        // 2 indices + 1 currency + 2 prices + 2 dominance + 2 circulating.
        assert_eq!(samples.len(), 9);

        let price = samples
            .iter()
            .find(|s| s.symbol == "BTC_price")
            .expect("btc price sample");
        assert_eq!(price.metric_type, "crypto");
        assert_eq!(price.value, Some(50_000.0));
        assert_eq!(price.change_pct, -2.0);

        let dominance = samples.iter().find(|s| s.symbol == "btc_dominance").unwrap();
        assert_eq!(dominance.value, Some(54.0));
    }

    #[tokio::test]
    async fn one_failing_source_does_not_block_the_rest() {
        let recorder = MarketMetricsRecorder::new(&small_cfg());
        let quotes = ScriptedQuotes {
            fail_symbols: vec!["^GSPC".to_string()],
        };
        let crypto = ScriptedCrypto { fail_prices: true };

        let samples = recorder.collect(&quotes, &crypto).await;
        // ^GSPC and both crypto prices dropped; everything else intact.
        assert!(samples.iter().all(|s| s.symbol != "SP_INDEX"));
        assert!(samples.iter().any(|s| s.symbol == "VIX"));
        assert!(samples.iter().any(|s| s.symbol == "btc_dominance"));
        assert!(samples.iter().all(|s| !s.symbol.ends_with("_price")));
    }

    #[test]
    fn trend_tags() {
        assert_eq!(trend_tag(0.4), "[UP]");
        assert_eq!(trend_tag(-0.4), "[DOWN]");
        assert_eq!(trend_tag(0.0), "[FLAT]");
    }
}
