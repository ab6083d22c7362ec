//! Text analysis: sentiment polarity and macro-keyword density.
//!
//! Sentiment comes from the VADER lexicon (compound score, already in [-1, 1]).
//! Macro relevance is the fraction of the configured macro vocabulary found in
//! the text, saturating at three distinct matches.

use vader_sentiment::SentimentIntensityAnalyzer;

use crate::config::PipelineConfig;

/// Three or more distinct macro terms in one article is treated as maximal
/// macro relevance. Tunable saturation constant, not a hard domain law.
const MACRO_SATURATION: f64 = 3.0;

pub struct TextAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
    macro_keywords: Vec<String>,
    fiscal_keywords: Vec<String>,
}

impl TextAnalyzer {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            macro_keywords: cfg.macro_keywords.clone(),
            fiscal_keywords: cfg.fiscal_keywords.clone(),
        }
    }

    /// Polarity in [-1, 1]. Deterministic for identical input; no side effects.
    pub fn sentiment(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0).clamp(-1.0, 1.0)
    }

    /// `min(distinct macro-keyword matches / 3, 1.0)`, case-insensitive
    /// substring match.
    pub fn macro_score(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        let matches = self
            .macro_keywords
            .iter()
            .filter(|kw| text_lower.contains(kw.as_str()))
            .count();
        (matches as f64 / MACRO_SATURATION).min(1.0)
    }

    /// First macro keyword present in the text, scanning in configured list
    /// order. Ties are broken by list order, not severity.
    pub fn first_macro_keyword(&self, text: &str) -> Option<&str> {
        let text_lower = text.to_lowercase();
        self.macro_keywords
            .iter()
            .find(|kw| text_lower.contains(kw.as_str()))
            .map(|kw| kw.as_str())
    }

    /// Matches the fiscal vocabulary used only by the ultra-priority source
    /// rules.
    pub fn contains_fiscal_keyword(&self, text: &str) -> bool {
        let text_lower = text.to_lowercase();
        self.fiscal_keywords
            .iter()
            .any(|kw| text_lower.contains(kw.as_str()))
    }
}
