//! Command handlers for the Deskbot CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod chat;
pub mod departments;
pub mod history;
pub mod init;

// Re-export command types for convenience
pub use chat::ChatCommand;
pub use departments::DepartmentsCommand;
pub use history::HistoryCommand;
pub use init::InitCommand;
