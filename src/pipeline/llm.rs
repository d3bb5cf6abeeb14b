//! LLM interaction: send extracted text for analysis and collect the answer.
//!
//! Prompt wording lives in [`crate::prompts`]; this module only assembles the
//! messages and handles retries.
//!
//! ## Retry Strategy
//!
//! By default a single request is made. When `max_retries > 0`, failed calls
//! are retried with exponential backoff (`retry_backoff_ms * 2^(n-1)` before
//! retry `n`): with a 500 ms base and 3 retries the waits are
//! 500 ms → 1 s → 2 s.

use crate::config::AnalysisConfig;
use crate::error::ExtractError;
use crate::prompts::{build_prompt, SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// The model's answer plus token accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResponse {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub retries: u32,
}

/// Analyse extracted text with the configured prompt.
///
/// Returns [`ExtractError::LlmApiError`] once every attempt has failed.
pub async fn analyze_text(
    provider: &Arc<dyn LLMProvider>,
    text: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisResponse, ExtractError> {
    let start = Instant::now();
    let prompt = build_prompt(config.kind, config.prompt_template.as_deref(), text);
    let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(&prompt)];
    let options = build_options(config);

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Analysis retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match provider.chat(&messages, Some(&options)).await {
            Ok(response) => {
                debug!(
                    "Analysis: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                return Ok(AnalysisResponse {
                    content: response.content,
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                    retries: attempt,
                });
            }
            Err(e) => {
                let err_msg = e.to_string();
                warn!("Analysis attempt {} failed: {}", attempt + 1, err_msg);
                last_err = Some(err_msg);
            }
        }
    }

    Err(ExtractError::LlmApiError {
        message: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Build `CompletionOptions` from the analysis config.
fn build_options(config: &AnalysisConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = AnalysisConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(2048));
    }

    #[test]
    fn build_options_follow_builder() {
        let config = AnalysisConfig::builder()
            .temperature(5.0)
            .max_tokens(300)
            .build()
            .unwrap();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(2.0));
        assert_eq!(opts.max_tokens, Some(300));
    }
}
