// Timed post generation on top of an LlmProvider
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::info;

use super::{LlmProvider, LlmRequest, UsageMetadata};

/// Generated text plus the bookkeeping shown next to the post
#[derive(Debug, Clone)]
pub struct Generation {
    pub content: String,
    pub usage: UsageMetadata,
    pub model: String,
    pub latency: Duration,
}

/// Send the system instruction and prompt as two ordered turns, exactly once.
/// Failures are returned as-is; there is no retry.
pub async fn generate_post<P: LlmProvider + ?Sized>(
    provider: &P,
    system_prompt: &str,
    prompt: &str,
) -> Result<Generation> {
    let request = LlmRequest::with_system(system_prompt, prompt);

    let started = Instant::now();
    let response = provider.generate(request).await?;
    let latency = started.elapsed();

    info!(
        model = %response.model,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        latency_ms = latency.as_millis() as u64,
        "LLM generation completed"
    );

    Ok(Generation {
        content: response.content,
        usage: response.usage,
        model: response.model,
        latency,
    })
}
