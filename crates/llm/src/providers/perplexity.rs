//! Perplexity generation provider implementation.
//!
//! This module provides integration with the Perplexity chat-completions API.
//! API reference: https://docs.perplexity.ai/api-reference/chat-completions

use crate::client::{ChatRequest, ChatResponse, Citation, GenerationClient};
use deskbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Hard timeout for a single completion call, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of search results converted into citations.
const MAX_CITATIONS: usize = 5;

/// Perplexity API request format.
#[derive(Debug, Serialize)]
struct PerplexityRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    return_citations: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

/// Perplexity API response format.
#[derive(Debug, Deserialize)]
struct PerplexityResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    search_results: Vec<WireSearchResult>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireSearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}

/// Perplexity generation client.
pub struct PerplexityClient {
    /// Base URL for the Perplexity API
    base_url: String,

    /// Bearer token for authentication
    api_key: String,

    /// HTTP client with the hard call timeout baked in
    client: reqwest::Client,
}

impl PerplexityClient {
    /// Create a new Perplexity client with default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new Perplexity client with a custom endpoint and timeout.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert ChatRequest to the Perplexity wire format.
    fn to_wire_request(&self, request: &ChatRequest) -> PerplexityRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(ref system) = request.system {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(WireMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        PerplexityRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            return_citations: request.return_citations,
        }
    }

    /// Convert a Perplexity response to ChatResponse.
    fn convert_response(
        &self,
        response: PerplexityResponse,
        model: &str,
    ) -> AppResult<ChatResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Provider("Response contained no choices".to_string()))?;

        let citations = response
            .search_results
            .into_iter()
            .take(MAX_CITATIONS)
            .map(|result| Citation {
                title: result.title,
                url: result.url,
                snippet: result.snippet,
            })
            .collect();

        Ok(ChatResponse {
            content,
            model: model.to_string(),
            citations,
        })
    }
}

#[async_trait::async_trait]
impl GenerationClient for PerplexityClient {
    fn provider_name(&self) -> &str {
        "perplexity"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending completion request to Perplexity");
        tracing::debug!("Request model: {}", request.model);

        let wire_request = self.to_wire_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Perplexity API error ({}): {}",
                status, error_text
            )));
        }

        let wire_response: PerplexityResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse response: {}", e)))?;

        tracing::info!("Received completion from Perplexity");

        self.convert_response(wire_response, &request.model)
    }
}
