//! History command handler.
//!
//! Lists and deletes a user's persisted conversations.

use clap::{Args, Subcommand};
use deskbot_core::{config::AppConfig, AppError, AppResult};
use deskbot_store::{ChatStore, User};

/// Conversation history management
#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List conversations, newest first
    List(HistoryListCommand),
    /// Delete a conversation by id
    Delete(HistoryDeleteCommand),
}

impl HistoryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            HistoryAction::List(cmd) => cmd.execute(config).await,
            HistoryAction::Delete(cmd) => cmd.execute(config).await,
        }
    }
}

fn resolve_user(store: &ChatStore, username: &str) -> AppResult<User> {
    store
        .find_user(username)?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))
}

/// List conversations
#[derive(Args, Debug)]
pub struct HistoryListCommand {
    /// Username whose history to list
    #[arg(short, long)]
    pub user: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HistoryListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Listing conversations for user '{}'", self.user);

        let store = ChatStore::open(&config.database)?;
        let user = resolve_user(&store, &self.user)?;
        let conversations = store.conversations_for_user(user.id)?;

        if self.json {
            let json = serde_json::to_string_pretty(&conversations)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else if conversations.is_empty() {
            println!("No conversations for '{}'", self.user);
        } else {
            for conversation in &conversations {
                println!(
                    "[{}] {} ({}): {}",
                    conversation.id,
                    conversation.created_at.format("%Y-%m-%d %H:%M"),
                    conversation.department,
                    conversation.user_message
                );
            }
        }

        Ok(())
    }
}

/// Delete a conversation
#[derive(Args, Debug)]
pub struct HistoryDeleteCommand {
    /// Conversation id to delete
    pub id: i64,

    /// Username owning the conversation
    #[arg(short, long)]
    pub user: String,
}

impl HistoryDeleteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Deleting conversation {} for user '{}'", self.id, self.user);

        let store = ChatStore::open(&config.database)?;
        let user = resolve_user(&store, &self.user)?;

        if store.delete_conversation(self.id, user.id)? {
            println!("Conversation {} deleted", self.id);
            Ok(())
        } else {
            Err(AppError::NotFound("Conversation not found".to_string()))
        }
    }
}
