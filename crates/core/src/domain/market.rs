use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest price for a symbol. `price: None` is the "no data" sentinel a
/// degraded quote fetch resolves to; it never raises into the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub price: Option<f64>,
    pub change_pct: f64,
}

impl Quote {
    pub fn no_data() -> Self {
        Self {
            price: None,
            change_pct: 0.0,
        }
    }
}

/// One intraday observation of an instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub ts: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
}

/// One row of the append-only metric time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMetricSample {
    pub ts: DateTime<Utc>,
    pub metric_type: String,
    pub symbol: String,
    pub value: Option<f64>,
    pub change_pct: f64,
    /// Auxiliary fields not captured by value/change (dominance %, supply, ...).
    pub extra: Option<serde_json::Value>,
}

impl MarketMetricSample {
    pub fn new(ts: DateTime<Utc>, metric_type: &str, symbol: &str) -> Self {
        Self {
            ts,
            metric_type: metric_type.to_string(),
            symbol: symbol.to_string(),
            value: None,
            change_pct: 0.0,
            extra: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_change(mut self, change_pct: f64) -> Self {
        self.change_pct = change_pct;
        self
    }

    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }
}
