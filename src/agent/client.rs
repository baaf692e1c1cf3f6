//! Chat completions client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Overloaded
//! responses (HTTP 503 and 529) are retried a bounded number of times with
//! a fixed wait.

use async_trait::async_trait;
use backoff::backoff::Backoff;
use reqwest::{header, Client};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::backend::ModelBackend;
use super::provider::ModelSelection;
use super::types::*;
use crate::config::ModelConfig;
use crate::error::{Error, Result};

/// Fixed interval between attempts, stopping after a total attempt count
#[derive(Debug, Clone)]
pub struct BoundedRetry {
    interval: Duration,
    max_attempts: u32,
    retries_left: u32,
}

impl BoundedRetry {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        let max_attempts = max_attempts.max(1);
        BoundedRetry {
            interval,
            max_attempts,
            retries_left: max_attempts - 1,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Backoff for BoundedRetry {
    fn reset(&mut self) {
        self.retries_left = self.max_attempts - 1;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;
        Some(self.interval)
    }
}

/// Chat completions client
#[derive(Clone)]
pub struct ChatClient {
    /// HTTP client
    client: Client,
    selection: ModelSelection,
    base_url: String,
    temperature: Option<f32>,
    retry: BoundedRetry,
}

impl ChatClient {
    /// Create a new client
    pub fn new(selection: ModelSelection, config: &ModelConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        // Add authorization header
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!(
                "Bearer {}",
                selection.api_key.expose_secret()
            ))
            .map_err(|e| Error::Config(format!("Invalid API key format: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| selection.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ChatClient {
            client,
            selection,
            base_url,
            temperature: config.temperature,
            retry: BoundedRetry::new(
                config.max_attempts,
                Duration::from_millis(config.retry_backoff_ms),
            ),
        })
    }

    /// The resolved model
    pub fn selection(&self) -> &ModelSelection {
        &self.selection
    }

    /// Send a request, retrying while the model is overloaded
    async fn send_with_retry(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let max_attempts = self.retry.max_attempts();
        let mut retries = 0;

        backoff::future::retry_notify(
            self.retry.clone(),
            move || async move {
                self.send_request(request).await.map_err(|e| {
                    if e.is_retryable() {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            },
            |_err: Error, _wait: Duration| {
                retries += 1;
                warn!(
                    "Model overloaded, retrying request {}/{}",
                    retries, max_attempts
                );
            },
        )
        .await
    }

    /// Send a single request
    async fn send_request(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to {}: model={}", url, request.model);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.json::<ChatCompletionResponse>().await?;

            if let Some(ref usage) = body.usage {
                info!(
                    "Model response: model={}, tokens={}",
                    body.model, usage.total_tokens
                );
            }

            return Ok(body);
        }

        let error_text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            503 | 529 => Err(Error::Overloaded(format!("{}: {}", status, error_text))),
            429 => {
                warn!("Rate limit exceeded: {}", error_text);
                Err(Error::RateLimit(error_text))
            }
            401 => Err(Error::Unauthorized("Invalid API key".to_string())),
            _ => Err(Error::Provider(format!(
                "API error ({}): {}",
                status,
                error_text
            ))),
        }
    }
}

#[async_trait]
impl ModelBackend for ChatClient {
    fn model_name(&self) -> String {
        self.selection.qualified_name()
    }

    async fn complete(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Result<Message> {
        let tool_choice = if tools.is_empty() {
            None
        } else if self.selection.provider.supports_required_tool_choice() {
            Some(ToolChoice::required())
        } else {
            Some(ToolChoice::auto())
        };

        let request = ChatCompletionRequest {
            model: self.selection.model.clone(),
            messages,
            temperature: self.temperature,
            tools: (!tools.is_empty()).then_some(tools),
            tool_choice,
        };

        let response = self.send_with_retry(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| Error::Provider("Response contained no choices".to_string()))
    }
}
