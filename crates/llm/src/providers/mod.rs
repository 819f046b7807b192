//! Generation provider implementations.

pub mod perplexity;

pub use perplexity::PerplexityClient;
