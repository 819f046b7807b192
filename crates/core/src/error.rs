//! Error types for the Deskbot CLI.
//!
//! This module defines a unified error enum covering every error category in
//! the application: configuration, I/O, generation provider, storage, and the
//! client-visible chat rejections (access, lookup, admission).

use thiserror::Error;

/// Unified error type for the Deskbot CLI.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation provider errors (transport, non-2xx status, bad payload).
    ///
    /// Inside the orchestrator this variant is absorbed into a degraded
    /// outcome and never reaches the caller.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Persistence sink errors. Fatal to the request.
    #[error("Storage error: {0}")]
    Store(String),

    /// The user's department grants do not cover the requested department.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// A user or department lookup came back empty.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The admission filter rejected the question. No provider call is made
    /// and no conversation record is written.
    #[error("{0}")]
    AdmissionRejected(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
