//! End-to-end runs of the pipeline against mocked news search, article hosts
//! and chat-completions endpoint.

use common::Config;
use mockito::{Matcher, Server, ServerGuard};
use newsdraft::pipeline::{GenerationRequest, PostGenerator};
use newsdraft::search::{fetch_article_urls, GoogleNewsSearch, SearchQuery};

fn rss_with_links(links: &[String]) -> String {
    let items: String = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            format!(
                "<item><title>Story {}</title><link>{}</link></item>\n",
                i + 1,
                link.replace('&', "&amp;")
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
<title>"renewable energy" - Google News</title>
<link>https://news.google.com</link>
<description>Google News</description>
{items}</channel>
</rss>"#
    )
}

fn article_page(headline: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{headline}</title></head><body>
<nav><a href="/">Home</a> <a href="/world">World</a></nav>
<article>
<h1>{headline}</h1>
<p>{body}</p>
<p>Analysts expect the trend to continue through the next decade as costs keep falling and
policy support broadens across major economies in Europe, Asia and the Americas.</p>
</article>
<footer>Copyright</footer>
</body></html>"#
    )
}

fn config_for(server: &ServerGuard) -> Config {
    let mut config = Config::default();
    config.search.base_url = format!("{}/rss/search", server.url());
    config.search.max_results = 10;
    config.llm.api_url = format!("{}/v1/chat/completions", server.url());
    config.scraping.timeout_seconds = 5;
    config
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "model": "o1-2024-12-17",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 1200, "completion_tokens": 640, "total_tokens": 1840}
    })
    .to_string()
}

async fn mock_search(server: &mut ServerGuard, links: &[String]) -> mockito::Mock {
    server
        .mock("GET", "/rss/search")
        .match_query(Matcher::UrlEncoded(
            "q".to_string(),
            "renewable energy when:1y".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(rss_with_links(links))
        .create_async()
        .await
}

#[tokio::test]
async fn technical_post_from_three_extracted_articles() {
    let mut server = Server::new_async().await;
    let base = server.url();

    // The duplicate and the tracking parameter exercise dedup and canonicalization.
    let links = vec![
        format!("{base}/articles/solar"),
        format!("{base}/articles/wind?ved=2ahUKE&usg=AOvVaw"),
        format!("{base}/articles/solar"),
        format!("{base}/articles/storage"),
    ];
    let search = mock_search(&mut server, &links).await;

    let pages = [
        ("/articles/solar", "Solar capacity hits record", "Solar installations grew faster than any forecast had predicted this year."),
        ("/articles/wind", "Offshore wind expands", "Offshore wind auctions attracted record bids from utilities and funds."),
        ("/articles/storage", "Batteries get cheaper", "Grid-scale battery storage costs dropped sharply for the third year running."),
    ];
    let mut page_mocks = Vec::new();
    for (path, headline, body) in pages {
        page_mocks.push(
            server
                .mock("GET", path)
                .with_status(200)
                .with_header("content-type", "text/html; charset=utf-8")
                .with_body(article_page(headline, body))
                .create_async()
                .await,
        );
    }

    let llm = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("aggregated article texts".to_string()),
            Matcher::Regex("Solar installations grew faster".to_string()),
            Matcher::Regex("Offshore wind auctions".to_string()),
            Matcher::Regex("Grid-scale battery storage".to_string()),
            Matcher::Regex("technical read".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("<h1>The economics of renewables</h1>"))
        .expect(1)
        .create_async()
        .await;

    let generator = PostGenerator::from_config(&config_for(&server), Some("test-key".to_string()))
        .expect("build generator");
    let request = GenerationRequest::new("renewable energy", "investors", Some("3".to_string()));
    let result = generator.generate(&request).await.expect("generate post");

    assert_eq!(result.post_html, "<h1>The economics of renewables</h1>");
    assert_eq!(result.style_label, "technical read");
    assert_eq!(result.topic, "renewable energy");
    assert_eq!(result.audience, "investors");
    assert_eq!(result.input_token_count, 1200);
    assert_eq!(result.output_token_count, 640);
    assert!(result.latency_seconds >= 0.0);
    assert!(!result.used_fallback);
    assert_eq!(result.sources.len(), 3);

    search.assert_async().await;
    for mock in page_mocks {
        mock.assert_async().await;
    }
    llm.assert_async().await;
}

#[tokio::test]
async fn failed_extractions_fall_back_to_topic_only_prompt() {
    let mut server = Server::new_async().await;
    let base = server.url();

    let links = vec![
        format!("{base}/articles/paywalled"),
        format!("{base}/articles/missing"),
        format!("{base}/articles/empty"),
    ];
    let _search = mock_search(&mut server, &links).await;

    let _paywalled = server
        .mock("GET", "/articles/paywalled")
        .with_status(403)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/articles/missing")
        .with_status(404)
        .create_async()
        .await;
    let _empty = server
        .mock("GET", "/articles/empty")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><head></head><body></body></html>")
        .create_async()
        .await;

    let llm = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("Using your expertise".to_string()),
            Matcher::Regex("based solely on the topic".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("<h1>Renewable energy outlook</h1>"))
        .expect(1)
        .create_async()
        .await;

    let generator = PostGenerator::from_config(&config_for(&server), Some("test-key".to_string()))
        .expect("build generator");
    let request = GenerationRequest::new("renewable energy", "investors", Some("3".to_string()));
    let result = generator.generate(&request).await.expect("generate post");

    assert!(result.used_fallback);
    assert!(result.sources.is_empty());
    assert_eq!(result.post_html, "<h1>Renewable energy outlook</h1>");

    llm.assert_async().await;
}

#[tokio::test]
async fn search_failure_is_fatal() {
    let mut server = Server::new_async().await;

    let _search = server
        .mock("GET", "/rss/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let llm = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let generator = PostGenerator::from_config(&config_for(&server), Some("test-key".to_string()))
        .expect("build generator");
    let request = GenerationRequest::new("renewable energy", "investors", None);
    let err = generator.generate(&request).await.unwrap_err();

    assert!(err.to_string().contains("503"));
    llm.assert_async().await;
}

#[tokio::test]
async fn generation_failure_is_fatal() {
    let mut server = Server::new_async().await;
    let _search = mock_search(&mut server, &[]).await;
    let _llm = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let generator = PostGenerator::from_config(&config_for(&server), Some("bad-key".to_string()))
        .expect("build generator");
    let request = GenerationRequest::new("renewable energy", "investors", Some("1".to_string()));
    let err = generator.generate(&request).await.unwrap_err();

    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn google_news_search_dedups_and_caps() {
    let mut server = Server::new_async().await;
    let links: Vec<String> = ["a", "b", "a", "c", "d", "b"]
        .iter()
        .map(|s| format!("https://news.example/{s}"))
        .collect();
    let _search = mock_search(&mut server, &links).await;

    let mut config = config_for(&server);
    config.search.max_results = 3;
    let search = GoogleNewsSearch::new(&config.search).expect("client");

    let urls = fetch_article_urls(&search, &SearchQuery::new("renewable energy", 3))
        .await
        .expect("search");
    assert_eq!(
        urls,
        vec![
            "https://news.example/a",
            "https://news.example/b",
            "https://news.example/c",
        ]
    );
}
