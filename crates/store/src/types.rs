//! Storage record types.

use chrono::{DateTime, Utc};
use deskbot_llm::Citation;
use serde::{Deserialize, Serialize};

/// An employee account.
///
/// Authentication mechanics (passwords, tokens) live outside this core; the
/// store only supports lookup by username and carries the department grants
/// used for access checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    /// "admin" or "user"
    pub role: String,
    /// Granted department keys; "all" is a universal grant
    pub departments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may chat within the given department.
    pub fn has_department_grant(&self, department_key: &str) -> bool {
        self.departments.iter().any(|d| d == "all" || d == department_key)
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Fields for inserting a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub role: String,
    pub departments: Vec<String>,
}

/// An organizational scope with its own generation context and blocklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    /// Unique stable key (e.g., "finance")
    pub key: String,
    pub name: String,
    pub description: String,
    /// Free-text contextual instructions steering generation
    pub ai_context: String,
    /// Ordered department-specific blocked phrases
    pub blocked_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new department.
#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub key: String,
    pub name: String,
    pub description: String,
    pub ai_context: String,
    pub blocked_keywords: Vec<String>,
}

/// A persisted question/answer exchange.
///
/// Written exactly once per completed orchestration and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub user_id: i64,
    pub department: String,
    pub user_message: String,
    pub ai_response: String,
    /// Citations in provider order, stored as structured JSON
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new conversation record.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub user_id: i64,
    pub department: String,
    pub user_message: String,
    pub ai_response: String,
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_departments(departments: &[&str]) -> User {
        User {
            id: 1,
            username: "jdoe".to_string(),
            name: "J. Doe".to_string(),
            role: "user".to_string(),
            departments: departments.iter().map(|d| d.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_department_grant() {
        let user = user_with_departments(&["finance", "hr"]);
        assert!(user.has_department_grant("finance"));
        assert!(!user.has_department_grant("engineering"));
    }

    #[test]
    fn test_all_grant_is_universal() {
        let user = user_with_departments(&["all"]);
        assert!(user.has_department_grant("finance"));
        assert!(user.has_department_grant("anything"));
    }
}
