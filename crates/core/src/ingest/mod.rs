pub mod rss;
pub mod social;

use crate::domain::article::Article;
use anyhow::Result;

/// A feed of raw articles or posts. A failing source yields an empty batch at
/// the call site, never a pipeline failure.
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &str;
}

/// Fetch every source sequentially and merge the results. Per-source failures
/// are logged at warn and contribute nothing.
pub async fn collect_articles(sources: &[Box<dyn ArticleSource>]) -> Vec<Article> {
    let mut out = Vec::new();
    for source in sources {
        match source.fetch().await {
            Ok(mut articles) => {
                tracing::debug!(source = source.name(), count = articles.len(), "source fetched");
                out.append(&mut articles);
            }
            Err(err) => {
                tracing::warn!(source = source.name(), error = %err, "source fetch failed");
            }
        }
    }
    out
}
