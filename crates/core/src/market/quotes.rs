//! Quote collaborator: latest price and intraday history per symbol.
//!
//! The HTTP implementation talks to a Yahoo-style chart endpoint (2d of 5m
//! candles). Both operations degrade to "no data" sentinels at the call site
//! rather than raising into the pipeline.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::market::{Candle, Quote};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const RANGE: &str = "2d";
const INTERVAL: &str = "5m";

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote>;
    /// Ordered intraday history, oldest first.
    async fn history(&self, symbol: &str) -> Result<Vec<Candle>>;
}

#[derive(Debug, Clone)]
pub struct ChartQuoteProvider {
    http: reqwest::Client,
    base_url: String,
}

impl ChartQuoteProvider {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let timeout_secs = std::env::var("QUOTE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; macrowire/0.1)")
            .build()
            .context("failed to build quote http client")?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_chart(&self, symbol: &str) -> Result<ChartResponse> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let res = self
            .http
            .get(url)
            .query(&[("range", RANGE), ("interval", INTERVAL)])
            .send()
            .await
            .context("chart request failed")?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "chart HTTP {status} for {symbol}");

        res.json::<ChartResponse>()
            .await
            .context("chart response is not valid JSON")
    }
}

#[async_trait::async_trait]
impl QuoteProvider for ChartQuoteProvider {
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let candles = self.history(symbol).await?;
        Ok(quote_from_history(&candles))
    }

    async fn history(&self, symbol: &str) -> Result<Vec<Candle>> {
        let resp = self.fetch_chart(symbol).await?;
        Ok(candles_from_chart(resp))
    }
}

/// Latest close vs. previous close, in percent. Fewer than two closes is the
/// "no data" sentinel.
pub fn quote_from_history(candles: &[Candle]) -> Quote {
    let [.., prev, last] = candles else {
        return Quote::no_data();
    };
    let change_pct = if prev.close != 0.0 {
        (last.close - prev.close) / prev.close * 100.0
    } else {
        0.0
    };
    Quote {
        price: Some(last.close),
        change_pct,
    }
}

// Chart payload shape: chart.result[0].{timestamp, indicators.quote[0].{close, volume}}.
// Nulls appear inside the arrays for halted periods; those slots are skipped.

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

fn candles_from_chart(resp: ChartResponse) -> Vec<Candle> {
    let Some(result) = resp.chart.result.and_then(|mut r| {
        if r.is_empty() {
            None
        } else {
            Some(r.remove(0))
        }
    }) else {
        return Vec::new();
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(block) = result.indicators.quote.into_iter().next() else {
        return Vec::new();
    };
    let closes = block.close.unwrap_or_default();
    let volumes = block.volume.unwrap_or_default();

    let mut out = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let volume = volumes.get(i).copied().flatten().unwrap_or(0.0);
        let Some(ts) = DateTime::<Utc>::from_timestamp(*ts, 0) else {
            continue;
        };
        out.push(Candle { ts, close, volume });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_fixture(closes: &[Option<f64>], volumes: &[Option<f64>]) -> ChartResponse {
        let timestamps: Vec<i64> = (0..closes.len() as i64).map(|i| 1_700_000_000 + i * 300).collect();
        let v = json!({
            "chart": {
                "result": [{
                    "timestamp": timestamps,
                    "indicators": { "quote": [{ "close": closes, "volume": volumes }] }
                }]
            }
        });
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn parses_candles_and_skips_null_closes() {
        let resp = chart_fixture(
            &[Some(100.0), None, Some(101.5)],
            &[Some(1_000.0), Some(2_000.0), None],
        );
        let candles = candles_from_chart(resp);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 100.0);
        assert_eq!(candles[1].close, 101.5);
        assert_eq!(candles[1].volume, 0.0); // null volume -> 0
    }

    #[test]
    fn empty_result_yields_no_candles() {
        let v = json!({ "chart": { "result": null } });
        let resp: ChartResponse = serde_json::from_value(v).unwrap();
        assert!(candles_from_chart(resp).is_empty());
    }

    #[test]
    fn quote_needs_two_closes() {
        let one = candles_from_chart(chart_fixture(&[Some(100.0)], &[Some(1.0)]));
        let q = quote_from_history(&one);
        assert!(q.price.is_none());
        assert_eq!(q.change_pct, 0.0);
    }

    #[test]
    fn quote_change_is_last_over_previous_close() {
        let candles = candles_from_chart(chart_fixture(
            &[Some(100.0), Some(102.0)],
            &[Some(1.0), Some(1.0)],
        ));
        let q = quote_from_history(&candles);
        assert_eq!(q.price, Some(102.0));
        assert!((q.change_pct - 2.0).abs() < 1e-9);
    }
}
