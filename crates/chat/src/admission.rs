//! Admission filter.
//!
//! Decides whether a submitted question may be forwarded to the generation
//! provider. A question is admitted only when it hits none of the blocked
//! phrases (global or department-specific) and mentions at least one
//! company-context phrase. Pure function, no hidden state.

/// Phrases blocked for every department, matched as lowercase substrings.
pub const GLOBAL_BLOCKED: &[&str] = &[
    "game of the year",
    "entertainment",
    "movies",
    "sports",
    "personal life",
    "dating",
    "weather",
    "celebrity",
    "gaming",
    "what is the weather",
    "tell me a joke",
    "movie recommendations",
];

/// Company-context vocabulary; at least one match is required for admission.
pub const COMPANY_CONTEXT: &[&str] = &[
    "budget",
    "finance",
    "tax",
    "policy",
    "procedure",
    "compliance",
    "employee",
    "department",
    "company",
    "revenue",
    "expense",
    "regulation",
    "audit",
    "business",
];

/// Message shown to the caller when a question is rejected.
pub const REJECTION_MESSAGE: &str =
    "This type of question is not allowed. Please ask about company-related topics only.";

/// Check whether a question is admitted for generation.
///
/// Matching is case-insensitive substring matching. Blocked phrases take
/// precedence over company context: a question hitting both is rejected.
/// The first blocklist hit short-circuits.
pub fn is_allowed(question: &str, department_blocklist: &[String]) -> bool {
    let normalized = question.to_lowercase();

    if GLOBAL_BLOCKED
        .iter()
        .any(|phrase| normalized.contains(phrase))
    {
        return false;
    }

    if department_blocklist
        .iter()
        .any(|phrase| normalized.contains(&phrase.to_lowercase()))
    {
        return false;
    }

    COMPANY_CONTEXT
        .iter()
        .any(|phrase| normalized.contains(phrase))
}
