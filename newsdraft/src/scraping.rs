use anyhow::{Context, Result};
use common::ScrapingConfig;
use reqwest::Client;
use scraper::{Html, Selector};
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::canonical::canonicalize_url;

/// Outcome of a best-effort article extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    /// Extraction failed; carries the cause for diagnostics.
    Unextractable(String),
}

impl Extraction {
    /// Empty or whitespace-only text counts as a failure.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Extraction::Unextractable("no readable text".to_string())
        } else {
            Extraction::Text(text)
        }
    }
}

/// An article URL together with what could be extracted from it.
#[derive(Debug, Clone)]
pub struct ExtractedArticle {
    pub source_url: String,
    pub extraction: Extraction,
}

/// Downloads and parses article text. Implementations never fail: every
/// problem is reported as [`Extraction::Unextractable`].
#[async_trait::async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Extraction;
}

/// Extractor based on readability, with a CSS-selector heuristic as fallback.
pub struct ReadabilityExtractor {
    client: Client,
    text_width: usize,
}

impl ReadabilityExtractor {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            client,
            text_width: config.text_width,
        })
    }

    async fn download_and_parse(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("failed to fetch article page")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("article fetch failed with status: {}", status));
        }

        // Redirects may land elsewhere; resolve relative links against the final URL.
        let final_url = response.url().clone();
        let html = response.text().await.context("failed to read response body")?;
        html_to_article_text(&html, &final_url, self.text_width)
    }
}

#[async_trait::async_trait]
impl ArticleExtractor for ReadabilityExtractor {
    async fn extract(&self, url: &str) -> Extraction {
        let cleaned = canonicalize_url(url);
        match self.download_and_parse(&cleaned).await {
            Ok(text) => {
                let extraction = Extraction::from_text(text);
                if let Extraction::Unextractable(reason) = &extraction {
                    warn!(%url, %reason, "scraping: article skipped");
                }
                extraction
            }
            Err(e) => {
                let cause = format!("{:#}", e);
                warn!(%url, error = %cause, "scraping: error extracting article");
                Extraction::Unextractable(cause)
            }
        }
    }
}

/// Turn an article page into plain text.
///
/// Readability runs first; if it fails or yields nothing, the first of a few
/// common content containers is used, then all `<p>` elements.
pub fn html_to_article_text(html: &str, url: &url::Url, width: usize) -> Result<String> {
    let mut reader = Cursor::new(html.as_bytes());
    match readability::extractor::extract(&mut reader, url) {
        Ok(product) => {
            let text = html2text::from_read(product.content.as_bytes(), width)
                .unwrap_or_else(|_| product.text.clone());
            if !text.trim().is_empty() {
                info!("scraping: readability extracted {} chars from {}", text.len(), url);
                return Ok(text);
            }
            debug!("scraping: readability found no text in {}", url);
        }
        Err(e) => {
            debug!("scraping: readability failed for {}: {}", url, e);
        }
    }

    selector_fallback(html, width)
}

fn selector_fallback(html: &str, width: usize) -> Result<String> {
    let document = Html::parse_document(html);

    let selectors = ["article", "main", ".post-content", ".entry-content", "#content"];
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = html2text::from_read(element.html().as_bytes(), width)
                .context("failed to convert article HTML to text")?;
            if !text.trim().is_empty() {
                info!("scraping: found content using selector '{}', {} chars", selector_str, text.len());
                return Ok(text);
            }
        }
    }

    let mut paragraphs = String::new();
    if let Ok(p_selector) = Selector::parse("p") {
        for element in document.select(&p_selector) {
            paragraphs.push_str(&element.html());
            paragraphs.push('\n');
        }
    }
    if paragraphs.is_empty() {
        anyhow::bail!("no article content found in page");
    }

    let text = html2text::from_read(paragraphs.as_bytes(), width)
        .context("failed to convert paragraphs to text")?;
    info!("scraping: fallback to all <p> tags, {} chars", text.len());
    Ok(text)
}
