//! Generation client factory.
//!
//! This module provides a factory for creating generation clients based on
//! application configuration. It handles provider resolution and secret
//! injection; the client is always constructed explicitly and passed into the
//! orchestrator rather than held in a process-wide singleton.

use crate::client::GenerationClient;
use crate::providers::PerplexityClient;
use std::sync::Arc;

/// Create a generation client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("perplexity")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by providers that authenticate)
/// * `timeout_secs` - Hard timeout for a single call
///
/// # Returns
/// A reference-counted trait object implementing `GenerationClient`
///
/// # Errors
/// Returns error if the provider is unknown, a required secret is missing,
/// or client initialization fails.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: u64,
) -> Result<Arc<dyn GenerationClient>, String> {
    match provider.to_lowercase().as_str() {
        "perplexity" => {
            let api_key = api_key.ok_or("Perplexity provider requires API key")?;
            let base_url = endpoint.unwrap_or("https://api.perplexity.ai");
            let client = PerplexityClient::with_options(api_key, base_url, timeout_secs)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}
