//! Orchestration outcome and reply types.

use deskbot_llm::Citation;
use serde::{Deserialize, Serialize};

/// Maximum citations carried by any outcome.
pub const MAX_CITATIONS: usize = 5;

/// Result of one orchestrated generation.
///
/// `Degraded` is success-shaped: the provider failed, but the caller still
/// gets an answer (the fixed apology) and a conversation record is still
/// written. Tests and callers can assert on the variant rather than on
/// logged side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The provider answered.
    Success {
        answer: String,
        /// Provider order, at most [`MAX_CITATIONS`] entries
        citations: Vec<Citation>,
    },

    /// The provider failed; the answer is the fixed apology text.
    Degraded { answer: String },
}

impl Outcome {
    /// The answer text of either variant.
    pub fn answer(&self) -> &str {
        match self {
            Self::Success { answer, .. } => answer,
            Self::Degraded { answer } => answer,
        }
    }

    /// The citations of either variant; always empty for `Degraded`.
    pub fn citations(&self) -> &[Citation] {
        match self {
            Self::Success { citations, .. } => citations,
            Self::Degraded { .. } => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Map the outcome into a caller-facing reply payload.
    ///
    /// Both variants map uniformly; `model` is the configured reported label,
    /// not necessarily the dispatched model identifier.
    pub fn into_reply(self, model: impl Into<String>) -> ChatReply {
        let model = model.into();
        match self {
            Self::Success { answer, citations } => ChatReply {
                answer,
                citations,
                model,
            },
            Self::Degraded { answer } => ChatReply {
                answer,
                citations: Vec::new(),
                model,
            },
        }
    }
}

/// Caller-facing reply payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub model: String,
}
