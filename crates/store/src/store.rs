//! SQLite-backed chat store.

use crate::types::{
    ConversationRecord, Department, NewConversation, NewDepartment, NewUser, User,
};
use chrono::{DateTime, Utc};
use deskbot_core::{AppError, AppResult};
use deskbot_llm::Citation;
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite-backed persistence sink for users, departments, and conversations.
pub struct ChatStore {
    conn: Connection,
}

impl ChatStore {
    /// Open (or create) the database at the given path.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Store(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Store(format!("Failed to open database: {}", e)))?;

        let store = Self { conn };
        store.migrate()?;

        tracing::debug!("Opened chat store at {:?}", db_path);
        Ok(store)
    }

    /// Open an in-memory database. Used in tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open in-memory database: {}", e)))?;

        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Create tables if they do not exist.
    fn migrate(&self) -> AppResult<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    role TEXT NOT NULL,
                    departments TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS departments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    key TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    ai_context TEXT NOT NULL,
                    blocked_keywords TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS conversations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    department TEXT NOT NULL,
                    user_message TEXT NOT NULL,
                    ai_response TEXT NOT NULL,
                    citations TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id);
                "#,
            )
            .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    /// Insert a user and return its id.
    pub fn insert_user(&self, user: &NewUser) -> AppResult<i64> {
        let departments_json = serde_json::to_string(&user.departments)?;

        self.conn
            .execute(
                "INSERT INTO users (username, name, role, departments, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.username,
                    user.name,
                    user.role,
                    departments_json,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Store(format!("Failed to insert user: {}", e)))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Look up a user by username.
    pub fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, name, role, departments, created_at
                 FROM users WHERE username = ?1",
            )
            .map_err(|e| AppError::Store(format!("Failed to prepare user query: {}", e)))?;

        let mut rows = stmt
            .query_map(params![username], row_to_user)
            .map_err(|e| AppError::Store(format!("Failed to query user: {}", e)))?;

        match rows.next() {
            Some(row) => Ok(Some(
                row.map_err(|e| AppError::Store(format!("Failed to read user row: {}", e)))?,
            )),
            None => Ok(None),
        }
    }

    /// Insert a department and return its id.
    pub fn insert_department(&self, department: &NewDepartment) -> AppResult<i64> {
        let blocked_json = serde_json::to_string(&department.blocked_keywords)?;

        self.conn
            .execute(
                "INSERT INTO departments (key, name, description, ai_context, blocked_keywords, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    department.key,
                    department.name,
                    department.description,
                    department.ai_context,
                    blocked_json,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Store(format!("Failed to insert department: {}", e)))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Look up a department by its stable key.
    pub fn find_department(&self, key: &str) -> AppResult<Option<Department>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, key, name, description, ai_context, blocked_keywords, created_at
                 FROM departments WHERE key = ?1",
            )
            .map_err(|e| AppError::Store(format!("Failed to prepare department query: {}", e)))?;

        let mut rows = stmt
            .query_map(params![key], row_to_department)
            .map_err(|e| AppError::Store(format!("Failed to query department: {}", e)))?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|e| {
                AppError::Store(format!("Failed to read department row: {}", e))
            })?)),
            None => Ok(None),
        }
    }

    /// List the departments visible to a user.
    ///
    /// Admins see everything; other users see only their granted keys.
    pub fn departments_for_user(&self, user: &User) -> AppResult<Vec<Department>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, key, name, description, ai_context, blocked_keywords, created_at
                 FROM departments ORDER BY key",
            )
            .map_err(|e| AppError::Store(format!("Failed to prepare department query: {}", e)))?;

        let rows = stmt
            .query_map([], row_to_department)
            .map_err(|e| AppError::Store(format!("Failed to query departments: {}", e)))?;

        let mut departments = Vec::new();
        for row in rows {
            let department = row
                .map_err(|e| AppError::Store(format!("Failed to read department row: {}", e)))?;
            if user.is_admin() || user.has_department_grant(&department.key) {
                departments.push(department);
            }
        }

        Ok(departments)
    }

    /// Insert a conversation record and return its id.
    ///
    /// A single self-contained insert; the caller performs it exactly once
    /// per completed orchestration.
    pub fn insert_conversation(&self, conversation: &NewConversation) -> AppResult<i64> {
        let citations_json = serde_json::to_string(&conversation.citations)?;

        self.conn
            .execute(
                "INSERT INTO conversations (user_id, department, user_message, ai_response, citations, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    conversation.user_id,
                    conversation.department,
                    conversation.user_message,
                    conversation.ai_response,
                    citations_json,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Store(format!("Failed to insert conversation: {}", e)))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Saved conversation {} for user {}", id, conversation.user_id);
        Ok(id)
    }

    /// List a user's conversations, newest first.
    pub fn conversations_for_user(&self, user_id: i64) -> AppResult<Vec<ConversationRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, department, user_message, ai_response, citations, created_at
                 FROM conversations WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| AppError::Store(format!("Failed to prepare conversation query: {}", e)))?;

        let rows = stmt
            .query_map(params![user_id], row_to_conversation)
            .map_err(|e| AppError::Store(format!("Failed to query conversations: {}", e)))?;

        let mut conversations = Vec::new();
        for row in rows {
            conversations.push(row.map_err(|e| {
                AppError::Store(format!("Failed to read conversation row: {}", e))
            })?);
        }

        Ok(conversations)
    }

    /// Delete a conversation, scoped to its owner.
    ///
    /// Returns `false` when no matching row exists (wrong id or not owned by
    /// the user).
    pub fn delete_conversation(&self, id: i64, user_id: i64) -> AppResult<bool> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM conversations WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .map_err(|e| AppError::Store(format!("Failed to delete conversation: {}", e)))?;

        Ok(deleted > 0)
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let departments_json: String = row.get(4)?;
    let departments: Vec<String> = serde_json::from_str(&departments_json)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        departments,
        created_at: parse_timestamp(row, 5)?,
    })
}

fn row_to_department(row: &Row<'_>) -> rusqlite::Result<Department> {
    let blocked_json: String = row.get(5)?;
    let blocked_keywords: Vec<String> = serde_json::from_str(&blocked_json)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Ok(Department {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        ai_context: row.get(4)?,
        blocked_keywords,
        created_at: parse_timestamp(row, 6)?,
    })
}

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<ConversationRecord> {
    let citations_json: String = row.get(5)?;
    let citations: Vec<Citation> = serde_json::from_str(&citations_json)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Ok(ConversationRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        department: row.get(2)?,
        user_message: row.get(3)?,
        ai_response: row.get(4)?,
        citations,
        created_at: parse_timestamp(row, 6)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> (ChatStore, i64) {
        let store = ChatStore::open_in_memory().unwrap();
        let user_id = store
            .insert_user(&NewUser {
                username: "jdoe".to_string(),
                name: "J. Doe".to_string(),
                role: "user".to_string(),
                departments: vec!["finance".to_string()],
            })
            .unwrap();
        (store, user_id)
    }

    fn sample_department(key: &str) -> NewDepartment {
        NewDepartment {
            key: key.to_string(),
            name: format!("{} department", key),
            description: String::new(),
            ai_context: "You assist with internal questions.".to_string(),
            blocked_keywords: vec!["crypto".to_string()],
        }
    }

    fn sample_conversation(user_id: i64, question: &str) -> NewConversation {
        NewConversation {
            user_id,
            department: "finance".to_string(),
            user_message: question.to_string(),
            ai_response: "Answer".to_string(),
            citations: vec![Citation {
                title: "Handbook".to_string(),
                url: "https://example.com/handbook".to_string(),
                snippet: "...".to_string(),
            }],
        }
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChatStore::open(&dir.path().join("nested/chat.db")).unwrap();
        assert!(store.find_user("nobody").unwrap().is_none());
    }

    #[test]
    fn test_user_roundtrip() {
        let (store, _) = seeded_store();
        let user = store.find_user("jdoe").unwrap().unwrap();
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.departments, vec!["finance".to_string()]);
        assert!(store.find_user("missing").unwrap().is_none());
    }

    #[test]
    fn test_department_roundtrip() {
        let (store, _) = seeded_store();
        store.insert_department(&sample_department("finance")).unwrap();

        let department = store.find_department("finance").unwrap().unwrap();
        assert_eq!(department.key, "finance");
        assert_eq!(department.blocked_keywords, vec!["crypto".to_string()]);
        assert!(store.find_department("engineering").unwrap().is_none());
    }

    #[test]
    fn test_departments_for_user_filters_grants() {
        let (store, _) = seeded_store();
        store.insert_department(&sample_department("finance")).unwrap();
        store.insert_department(&sample_department("hr")).unwrap();

        let user = store.find_user("jdoe").unwrap().unwrap();
        let visible = store.departments_for_user(&user).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].key, "finance");
    }

    #[test]
    fn test_departments_for_admin_sees_all() {
        let (store, _) = seeded_store();
        store.insert_department(&sample_department("finance")).unwrap();
        store.insert_department(&sample_department("hr")).unwrap();
        store
            .insert_user(&NewUser {
                username: "admin".to_string(),
                name: "Admin".to_string(),
                role: "admin".to_string(),
                departments: vec!["all".to_string()],
            })
            .unwrap();

        let admin = store.find_user("admin").unwrap().unwrap();
        assert_eq!(store.departments_for_user(&admin).unwrap().len(), 2);
    }

    #[test]
    fn test_conversation_roundtrip_and_ordering() {
        let (store, user_id) = seeded_store();
        let first = store
            .insert_conversation(&sample_conversation(user_id, "first question"))
            .unwrap();
        let second = store
            .insert_conversation(&sample_conversation(user_id, "second question"))
            .unwrap();

        let conversations = store.conversations_for_user(user_id).unwrap();
        assert_eq!(conversations.len(), 2);
        // Newest first
        assert_eq!(conversations[0].id, second);
        assert_eq!(conversations[1].id, first);
        assert_eq!(conversations[0].citations[0].title, "Handbook");
    }

    #[test]
    fn test_delete_conversation_scoped_to_owner() {
        let (store, user_id) = seeded_store();
        let id = store
            .insert_conversation(&sample_conversation(user_id, "question"))
            .unwrap();

        // Wrong owner deletes nothing
        assert!(!store.delete_conversation(id, user_id + 1).unwrap());
        assert_eq!(store.conversations_for_user(user_id).unwrap().len(), 1);

        assert!(store.delete_conversation(id, user_id).unwrap());
        assert!(store.conversations_for_user(user_id).unwrap().is_empty());
    }
}
