//! Quarantine policy: decides whether an article joins the macro-risk watch
//! list. Entries are never removed here; the list is monotonic.

use crate::analyze::TextAnalyzer;
use crate::config::PipelineConfig;
use crate::domain::article::{Article, QuarantineTrigger};

pub struct QuarantinePolicy {
    cfg: PipelineConfig,
}

impl QuarantinePolicy {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Returns the trigger if the article qualifies, independent of its
    /// impact score. The ultra-priority fiscal rule takes precedence over the
    /// macro-score path so the sentinel tag is never shadowed by a keyword.
    pub fn evaluate(
        &self,
        article: &Article,
        analyzer: &TextAnalyzer,
        macro_score: f64,
    ) -> Option<QuarantineTrigger> {
        let full_text = article.full_text();

        if self.cfg.is_ultra_source(&article.source)
            && analyzer.contains_fiscal_keyword(&full_text)
        {
            return Some(QuarantineTrigger::FiscalUltra);
        }

        if macro_score > self.cfg.quarantine_threshold {
            if let Some(kw) = analyzer.first_macro_keyword(&full_text) {
                return Some(QuarantineTrigger::Keyword(kw.to_string()));
            }
        }

        None
    }
}
