use anyhow::Result;
use common::Config;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::llm::generation::generate_post;
use crate::llm::remote::RemoteLlmProvider;
use crate::llm::LlmProvider;
use crate::prompt::{build_prompt, PromptKind, Style};
use crate::scraping::{ArticleExtractor, ExtractedArticle, Extraction, ReadabilityExtractor};
use crate::search::{fetch_article_urls, GoogleNewsSearch, NewsSearch, SearchQuery};

/// Form input for one post.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub audience: String,
    pub style_code: Option<String>,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, audience: impl Into<String>, style_code: Option<String>) -> Self {
        Self {
            topic: topic.into(),
            audience: audience.into(),
            style_code,
        }
    }

    pub fn style(&self) -> Style {
        Style::from_code(self.style_code.as_deref())
    }
}

/// Everything shown to the user after a generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub topic: String,
    pub audience: String,
    pub style_label: String,
    pub post_html: String,
    pub input_token_count: usize,
    pub output_token_count: usize,
    pub latency_seconds: f64,
    pub model: String,
    /// URLs whose text went into the prompt, in order
    pub sources: Vec<String>,
    pub used_fallback: bool,
}

/// Search → extract → prompt → generate, one step after the other.
/// Holds no per-request state; one instance serves every request.
pub struct PostGenerator {
    search: Arc<dyn NewsSearch>,
    extractor: Arc<dyn ArticleExtractor>,
    llm: Arc<dyn LlmProvider>,
    max_results: usize,
    system_prompt: String,
}

impl PostGenerator {
    pub fn new(
        search: Arc<dyn NewsSearch>,
        extractor: Arc<dyn ArticleExtractor>,
        llm: Arc<dyn LlmProvider>,
        max_results: usize,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            search,
            extractor,
            llm,
            max_results,
            system_prompt: system_prompt.into(),
        }
    }

    /// Wire the production providers from configuration.
    pub fn from_config(config: &Config, api_key: Option<String>) -> Result<Self> {
        let search = GoogleNewsSearch::new(&config.search)?;
        let extractor = ReadabilityExtractor::new(&config.scraping)?;
        let llm = RemoteLlmProvider::from_config(&config.llm, api_key);

        Ok(Self::new(
            Arc::new(search),
            Arc::new(extractor),
            Arc::new(llm),
            config.search.max_results,
            config.llm.system_prompt.clone(),
        ))
    }

    /// Extract every URL in order. Failures are kept as `Unextractable`.
    pub async fn extract_articles(&self, urls: &[String]) -> Vec<ExtractedArticle> {
        let mut articles = Vec::with_capacity(urls.len());
        for url in urls {
            info!(%url, "pipeline: processing article");
            let extraction = self.extractor.extract(url).await;
            articles.push(ExtractedArticle {
                source_url: url.clone(),
                extraction,
            });
        }
        articles
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let style = request.style();

        info!(topic = %request.topic, "pipeline: fetching articles");
        let query = SearchQuery::new(request.topic.clone(), self.max_results);
        let urls = fetch_article_urls(self.search.as_ref(), &query).await?;

        let articles = self.extract_articles(&urls).await;

        let mut sources = Vec::new();
        let mut texts = Vec::new();
        for article in articles {
            match article.extraction {
                Extraction::Text(text) if !text.trim().is_empty() => {
                    sources.push(article.source_url);
                    texts.push(text);
                }
                Extraction::Text(_) => {
                    debug!(url = %article.source_url, "pipeline: skipping article with no extractable text");
                }
                Extraction::Unextractable(reason) => {
                    debug!(url = %article.source_url, %reason, "pipeline: skipping article");
                }
            }
        }

        let prompt = build_prompt(&texts, &request.topic, &request.audience, style);
        if prompt.kind == PromptKind::Fallback {
            info!("pipeline: no article text could be extracted, using fallback prompt");
        } else {
            info!(articles = texts.len(), "pipeline: built sourced prompt");
        }

        info!("pipeline: generating post");
        let generation = generate_post(self.llm.as_ref(), &self.system_prompt, &prompt.text).await?;

        let result = GenerationResult {
            topic: request.topic.clone(),
            audience: request.audience.clone(),
            style_label: style.label().to_string(),
            post_html: generation.content,
            input_token_count: generation.usage.prompt_tokens,
            output_token_count: generation.usage.completion_tokens,
            latency_seconds: generation.latency.as_secs_f64(),
            model: generation.model,
            sources,
            used_fallback: prompt.kind == PromptKind::Fallback,
        };

        info!(
            topic = %result.topic,
            style = %result.style_label,
            input_tokens = result.input_token_count,
            output_tokens = result.output_token_count,
            latency_seconds = result.latency_seconds,
            "pipeline: post generated"
        );
        Ok(result)
    }
}
