//! Crypto metrics collaborator, CoinGecko-shaped API.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// USD price plus 24h change for one coin.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CoinQuote {
    #[serde(rename = "usd")]
    pub usd_price: Option<f64>,
    #[serde(rename = "usd_24h_change")]
    pub usd_24h_change: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct SupplyInfo {
    pub circulating: Option<f64>,
    pub total: Option<f64>,
}

#[async_trait::async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Price + 24h change per coin id (e.g. "bitcoin").
    async fn price_and_change(&self, ids: &[String]) -> Result<HashMap<String, CoinQuote>>;
    /// Market-cap dominance percentage per coin ticker.
    async fn global_dominance(&self) -> Result<HashMap<String, f64>>;
    async fn supply_info(&self, id: &str) -> Result<SupplyInfo>;
}

#[derive(Debug, Clone)]
pub struct CoinGeckoProvider {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let timeout_secs = std::env::var("CRYPTO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build crypto http client")?;

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("crypto request failed: {path}"))?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "crypto HTTP {status} for {path}");

        res.json::<T>()
            .await
            .with_context(|| format!("crypto response is not valid JSON: {path}"))
    }
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    market_cap_percentage: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct CoinDetail {
    market_data: Option<CoinMarketData>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    circulating_supply: Option<f64>,
    total_supply: Option<f64>,
}

#[async_trait::async_trait]
impl CryptoProvider for CoinGeckoProvider {
    async fn price_and_change(&self, ids: &[String]) -> Result<HashMap<String, CoinQuote>> {
        let ids_param = ids.join(",");
        self.get_json(
            "/simple/price",
            &[
                ("ids", ids_param.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ],
        )
        .await
    }

    async fn global_dominance(&self) -> Result<HashMap<String, f64>> {
        let resp: GlobalResponse = self.get_json("/global", &[]).await?;
        Ok(resp.data.market_cap_percentage)
    }

    async fn supply_info(&self, id: &str) -> Result<SupplyInfo> {
        let path = format!("/coins/{id}");
        let detail: CoinDetail = self
            .get_json(
                &path,
                &[
                    ("localization", "false"),
                    ("tickers", "false"),
                    ("community_data", "false"),
                    ("developer_data", "false"),
                ],
            )
            .await?;

        let md = detail.market_data;
        Ok(SupplyInfo {
            circulating: md.as_ref().and_then(|m| m.circulating_supply),
            total: md.as_ref().and_then(|m| m.total_supply),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_simple_price_payload() {
        let v = json!({
            "bitcoin": { "usd": 97123.5, "usd_24h_change": -1.25 },
            "ethereum": { "usd": 3421.0, "usd_24h_change": 2.4 }
        });
        let parsed: HashMap<String, CoinQuote> = serde_json::from_value(v).unwrap();
        assert_eq!(parsed["bitcoin"].usd_price, Some(97123.5));
        assert_eq!(parsed["ethereum"].usd_24h_change, Some(2.4));
    }

    #[test]
    fn parses_global_dominance_payload() {
        let v = json!({
            "data": { "market_cap_percentage": { "btc": 54.2, "eth": 13.1 } }
        });
        let parsed: GlobalResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.data.market_cap_percentage["btc"], 54.2);
    }

    #[test]
    fn coin_detail_tolerates_missing_market_data() {
        let v = json!({ "id": "ethereum" });
        let parsed: CoinDetail = serde_json::from_value(v).unwrap();
        assert!(parsed.market_data.is_none());
    }
}
