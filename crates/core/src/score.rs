//! Impact scoring: folds sentiment magnitude, macro density, headline
//! heuristics and the ultra-priority source boost into one bounded score.

use crate::analyze::TextAnalyzer;
use crate::config::PipelineConfig;
use crate::domain::article::Article;

const SENTIMENT_WEIGHT: f64 = 0.4;
const MACRO_WEIGHT: f64 = 0.4;
const HOT_KEYWORD_BONUS: f64 = 0.2;
/// The fixed fast-track bonus for the designated ultra-priority source.
/// Alone it is enough to clear most of the default impact threshold.
const ULTRA_SOURCE_BONUS: f64 = 0.4;

const HOT_TITLE_KEYWORDS: [&str; 3] = ["fed", "cpi", "jobs"];

pub struct ImpactScorer {
    cfg: PipelineConfig,
}

impl ImpactScorer {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Combined impact in [0, 1]. Sentiment magnitude and macro density are
    /// the two primary signals (equal weight, capped contribution); the
    /// headline hot-keywords and the ultra-priority source each add a fixed
    /// bonus; the sum is clamped.
    pub fn compute_impact(
        &self,
        article: &Article,
        analyzer: &TextAnalyzer,
        sentiment: f64,
        macro_score: f64,
    ) -> f64 {
        let base = sentiment.abs() * SENTIMENT_WEIGHT;
        let macro_boost = macro_score.clamp(0.0, 1.0) * MACRO_WEIGHT;

        let title_lower = article.title.to_lowercase();
        let hot = if HOT_TITLE_KEYWORDS.iter().any(|k| title_lower.contains(k)) {
            HOT_KEYWORD_BONUS
        } else {
            0.0
        };

        let ultra = if self.cfg.is_ultra_source(&article.source)
            && analyzer.contains_fiscal_keyword(&article.full_text())
        {
            ULTRA_SOURCE_BONUS
        } else {
            0.0
        };

        (base + macro_boost + hot + ultra).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(title: &str, summary: &str, source: &str) -> Article {
        Article {
            title: title.to_string(),
            summary: summary.to_string(),
            link: "https://example.com/a".to_string(),
            pub_date: Utc::now(),
            source: source.to_string(),
        }
    }

    fn scorer_and_analyzer() -> (ImpactScorer, TextAnalyzer) {
        let cfg = PipelineConfig::default();
        (ImpactScorer::new(&cfg), TextAnalyzer::new(&cfg))
    }

    #[test]
    fn clamps_even_when_all_bonuses_apply() {
        let (scorer, analyzer) = scorer_and_analyzer();
        let art = article(
            "Fed hikes as cpi and jobs surprise",
            "tariffs everywhere",
            "Truth Social (@realDonaldTrump)",
        );
        // |sentiment| and macro score at their extremes plus both bonuses.
        let impact = scorer.compute_impact(&art, &analyzer, -1.0, 1.0);
        assert_eq!(impact, 1.0);

        // Out-of-range inputs still produce a valid score.
        let wild = scorer.compute_impact(&art, &analyzer, -5.0, 7.0);
        assert!((0.0..=1.0).contains(&wild));
    }

    #[test]
    fn fed_hike_scenario_scores_point_seventy_two() {
        let (scorer, analyzer) = scorer_and_analyzer();
        let art = article(
            "Fed hikes rates amid inflation fears",
            "Markets brace for the impact of the rate hike.",
            "Reuters Business News",
        );
        // macroScore 1.0 (fed + rate hike + inflation), sentiment -0.3:
        // 0.12 + 0.4 + 0.2 (title has "fed") = 0.72.
        let impact = scorer.compute_impact(&art, &analyzer, -0.3, 1.0);
        assert!((impact - 0.72).abs() < 1e-9, "got {impact}");
    }

    #[test]
    fn ultra_source_fast_track_scores_point_four_alone() {
        let (scorer, analyzer) = scorer_and_analyzer();
        let art = article(
            "SOCIAL: big announcement on tariffs...",
            "We will put tariffs on everything",
            "Truth Social (@realDonaldTrump)",
        );
        // Title avoids the hot keywords; neutral sentiment, zero macro density
        // aside from the boost... "tariff" is a macro keyword, so pass 0.0
        // explicitly to isolate the source bonus.
        let impact = scorer.compute_impact(&art, &analyzer, 0.0, 0.0);
        assert!((impact - 0.4).abs() < 1e-9, "got {impact}");
    }

    #[test]
    fn fiscal_text_from_ordinary_source_gets_no_boost() {
        let (scorer, analyzer) = scorer_and_analyzer();
        let art = article(
            "Column: thoughts on tariffs",
            "tariffs and the economy",
            "Some Blog",
        );
        let impact = scorer.compute_impact(&art, &analyzer, 0.0, 0.0);
        assert_eq!(impact, 0.0);
    }

    #[test]
    fn hot_keyword_applies_to_title_only() {
        let (scorer, analyzer) = scorer_and_analyzer();
        let in_summary = article("Quiet market day", "the fed might act", "Wire");
        assert_eq!(
            scorer.compute_impact(&in_summary, &analyzer, 0.0, 0.0),
            0.0
        );

        let in_title = article("Jobs numbers due", "", "Wire");
        let impact = scorer.compute_impact(&in_title, &analyzer, 0.0, 0.0);
        assert!((impact - 0.2).abs() < 1e-9);
    }
}
