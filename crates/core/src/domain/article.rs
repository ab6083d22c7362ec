use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fetched article or social post, immutable once fetched.
/// Identity is `link`: two articles with the same link are the same entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub source: String,
}

impl Article {
    /// Text blob the analyzer runs over.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// An article plus its analysis results. Created once per unique article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub article: Article,
    /// Polarity in [-1, 1].
    pub sentiment: f64,
    /// Macro-keyword density in [0, 1].
    pub macro_score: f64,
    /// Combined impact in [0, 1].
    pub impact_score: f64,
    pub processed_at: DateTime<Utc>,
}

/// Why an article entered the macro-risk watch list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarantineTrigger {
    /// First macro keyword found in the text, in configured list order.
    Keyword(String),
    /// Ultra-priority source + fiscal keyword rule; distinct from any
    /// keyword-derived trigger.
    FiscalUltra,
}

impl QuarantineTrigger {
    pub fn as_tag(&self) -> &str {
        match self {
            QuarantineTrigger::Keyword(kw) => kw,
            QuarantineTrigger::FiscalUltra => "FISCAL_ULTRA",
        }
    }
}

/// Observed market reaction of one instrument to a high-impact article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockImpact {
    pub symbol: String,
    /// Fractional close-to-close move over the recent window.
    pub price_change: f64,
    /// Recent mean volume / baseline mean volume.
    pub volume_spike: f64,
}

/// Priority label derived from the impact score, for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    UltraHigh,
    High,
    Med,
    Low,
}

impl Priority {
    pub fn from_impact(impact_score: f64) -> Self {
        if impact_score > 0.9 {
            Priority::UltraHigh
        } else if impact_score > 0.7 {
            Priority::High
        } else if impact_score > 0.4 {
            Priority::Med
        } else {
            Priority::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::UltraHigh => "ULTRA-HIGH",
            Priority::High => "HIGH",
            Priority::Med => "MED",
            Priority::Low => "LOW",
        }
    }
}
