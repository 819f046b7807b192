//! Generation client abstraction and request/response types.
//!
//! This module defines the core abstractions for talking to the external
//! answer-generation service.

use deskbot_core::AppResult;
use serde::{Deserialize, Serialize};

/// Generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question text
    pub prompt: String,

    /// Model identifier (e.g., "sonar", "sonar-pro")
    pub model: String,

    /// System-role content steering the generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request supporting citations from the provider
    #[serde(default)]
    pub return_citations: bool,
}

impl ChatRequest {
    /// Create a new request with required fields.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system: None,
            max_tokens: None,
            temperature: None,
            return_citations: false,
        }
    }

    /// Set the system-role content.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask the provider for supporting citations.
    pub fn with_citations(mut self) -> Self {
        self.return_citations = true;
        self
    }
}

/// A structured reference supporting a generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Title of the cited source
    #[serde(default)]
    pub title: String,

    /// Source URL
    #[serde(default)]
    pub url: String,

    /// Short excerpt from the source
    #[serde(default)]
    pub snippet: String,
}

/// Generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated answer text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Supporting citations, in provider order
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Trait for generation providers.
///
/// This trait abstracts the underlying provider and gives the orchestrator a
/// single injection point, so tests can substitute a mock and production code
/// constructs the client explicitly rather than through a process-wide
/// singleton.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Get the provider name (e.g., "perplexity").
    fn provider_name(&self) -> &str;

    /// Perform a single completion call.
    ///
    /// # Arguments
    /// * `request` - The generation request
    ///
    /// # Returns
    /// The answer text plus any citations the provider returned
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new("What is the travel policy?", "sonar")
            .with_system("context")
            .with_max_tokens(500)
            .with_temperature(0.7)
            .with_citations();

        assert_eq!(request.prompt, "What is the travel policy?");
        assert_eq!(request.model, "sonar");
        assert_eq!(request.system.as_deref(), Some("context"));
        assert_eq!(request.max_tokens, Some(500));
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.return_citations);
    }

    #[test]
    fn test_citation_deserializes_missing_fields() {
        let citation: Citation = serde_json::from_str(r#"{"title": "Handbook"}"#).unwrap();
        assert_eq!(citation.title, "Handbook");
        assert_eq!(citation.url, "");
        assert_eq!(citation.snippet, "");
    }
}
