//! Departments command handler.

use clap::Args;
use deskbot_core::{config::AppConfig, AppError, AppResult};
use deskbot_store::ChatStore;

/// List departments visible to a user
#[derive(Args, Debug)]
pub struct DepartmentsCommand {
    /// Username to list departments for
    #[arg(short, long)]
    pub user: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DepartmentsCommand {
    /// Execute the departments command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing departments command for user '{}'", self.user);

        let store = ChatStore::open(&config.database)?;

        let user = store
            .find_user(&self.user)?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", self.user)))?;

        let departments = store.departments_for_user(&user)?;

        if self.json {
            let json = serde_json::to_string_pretty(&departments)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else if departments.is_empty() {
            println!("No departments visible to '{}'", self.user);
        } else {
            for department in &departments {
                println!("{:<16} {}", department.key, department.name);
            }
        }

        Ok(())
    }
}
