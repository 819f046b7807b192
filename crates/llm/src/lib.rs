//! Generation provider crate for the Deskbot CLI.
//!
//! This crate provides a provider-agnostic abstraction for the external
//! answer-generation service. It supports multiple providers through a
//! unified trait-based interface.
//!
//! # Providers
//! - **Perplexity**: hosted search-grounded generation (default)
//!
//! # Example
//! ```no_run
//! use deskbot_llm::{ChatRequest, GenerationClient, providers::PerplexityClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PerplexityClient::new("api-key")?;
//! let request = ChatRequest::new("What is our travel policy?", "sonar")
//!     .with_system("You are a company assistant.")
//!     .with_citations();
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatRequest, ChatResponse, Citation, GenerationClient};
pub use factory::create_client;
pub use providers::PerplexityClient;
