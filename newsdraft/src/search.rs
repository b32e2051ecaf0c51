use anyhow::{Context, Result};
use common::SearchConfig;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// One news search for a topic.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub topic: String,
    pub max_results: usize,
}

impl SearchQuery {
    pub fn new(topic: impl Into<String>, max_results: usize) -> Self {
        Self {
            topic: topic.into(),
            max_results,
        }
    }
}

/// A news search provider. Returns result links in the provider's own order,
/// duplicates included; deduplication happens in [`fetch_article_urls`].
#[async_trait::async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(&self, topic: &str) -> Result<Vec<String>>;
}

/// Query the provider and keep up to `max_results` distinct links, first occurrence wins.
/// Provider errors are returned unchanged.
pub async fn fetch_article_urls<S: NewsSearch + ?Sized>(
    provider: &S,
    query: &SearchQuery,
) -> Result<Vec<String>> {
    let links = provider.search(&query.topic).await?;
    let total = links.len();
    let urls = dedupe_links(links, query.max_results);
    info!(
        topic = %query.topic,
        returned = total,
        kept = urls.len(),
        "search: collected candidate article URLs"
    );
    Ok(urls)
}

/// Order-preserving exact-match deduplication, capped at `max`.
pub fn dedupe_links<I>(links: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for link in links {
        if urls.len() >= max {
            break;
        }
        if link.is_empty() {
            continue;
        }
        if seen.insert(link.clone()) {
            urls.push(link);
        }
    }
    urls
}

/// Google News RSS search, restricted to a trailing time window via `when:<period>`.
pub struct GoogleNewsSearch {
    base_url: String,
    period: String,
    language: String,
    region: String,
    client: Client,
}

impl GoogleNewsSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Newsdraft/0.1.0")
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            period: config.period.clone(),
            language: config.language.clone(),
            region: config.region.clone(),
            client,
        })
    }

    /// Build the RSS search URL for a topic.
    pub fn search_url(&self, topic: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid search base URL: {}", self.base_url))?;

        let q = if self.period.trim().is_empty() {
            topic.trim().to_string()
        } else {
            format!("{} when:{}", topic.trim(), self.period.trim())
        };
        // ceid wants the bare language subtag: "en-US" -> "US:en"
        let lang = self.language.split('-').next().unwrap_or(&self.language);

        url.query_pairs_mut()
            .append_pair("q", &q)
            .append_pair("hl", &self.language)
            .append_pair("gl", &self.region)
            .append_pair("ceid", &format!("{}:{}", self.region, lang));
        Ok(url)
    }
}

#[async_trait::async_trait]
impl NewsSearch for GoogleNewsSearch {
    async fn search(&self, topic: &str) -> Result<Vec<String>> {
        let url = self.search_url(topic)?;
        debug!(%url, "search: querying news provider");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .context("news search request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("news search failed with status: {}", status);
        }

        let bytes = response.bytes().await.context("failed to read search response body")?;
        parse_result_links(bytes.as_ref())
    }
}

/// Extract the `link` of every feed entry, in document order.
pub fn parse_result_links(body: &[u8]) -> Result<Vec<String>> {
    let feed = feed_rs::parser::parse(body).context("failed to parse news search feed")?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| entry.links.into_iter().next().map(|l| l.href))
        .collect())
}
