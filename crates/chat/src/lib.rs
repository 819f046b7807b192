//! Chat pipeline crate for the Deskbot CLI.
//!
//! This crate holds the decision logic of the assistant: whether a question
//! is admitted at all, whether the user may ask it in the requested
//! department, how the system context is assembled, and how the external
//! generation call is orchestrated and persisted.
//!
//! Control flow for one question:
//! access check → admission filter → orchestrator (context build, provider
//! call, normalization, persistence) → outcome.

pub mod access;
pub mod admission;
pub mod context;
pub mod orchestrator;
pub mod types;

// Re-export main types
pub use access::ensure_department_access;
pub use admission::{is_allowed, REJECTION_MESSAGE};
pub use context::build_system_context;
pub use orchestrator::{Orchestrator, FALLBACK_MESSAGE};
pub use types::{ChatReply, Outcome, MAX_CITATIONS};
