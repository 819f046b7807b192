//! Persistence sink for the Deskbot CLI.
//!
//! SQLite-backed storage for users, departments, and conversation records.
//! Each write is a single self-contained insert; the store provides no
//! cross-request shared mutable state beyond the database connection itself.

pub mod store;
pub mod types;

pub use store::ChatStore;
pub use types::{
    ConversationRecord, Department, NewConversation, NewDepartment, NewUser, User,
};
