//! Init command handler.
//!
//! Seeds the database with a default admin user and sample departments so a
//! fresh install is immediately usable.

use clap::Args;
use deskbot_core::{config::AppConfig, AppResult};
use deskbot_store::{ChatStore, NewDepartment, NewUser};

/// Seed the database with a default admin user and sample departments
#[derive(Args, Debug)]
pub struct InitCommand {}

impl InitCommand {
    /// Execute the init command. Existing users and departments are left
    /// untouched.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Seeding database at {:?}", config.database);

        let store = ChatStore::open(&config.database)?;

        if store.find_user("admin")?.is_none() {
            store.insert_user(&NewUser {
                username: "admin".to_string(),
                name: "System Administrator".to_string(),
                role: "admin".to_string(),
                departments: vec!["all".to_string()],
            })?;
            println!("Created user: admin");
        } else {
            println!("User already exists: admin");
        }

        for department in default_departments() {
            if store.find_department(&department.key)?.is_none() {
                store.insert_department(&department)?;
                println!("Created department: {}", department.key);
            } else {
                println!("Department already exists: {}", department.key);
            }
        }

        Ok(())
    }
}

fn default_departments() -> Vec<NewDepartment> {
    vec![
        NewDepartment {
            key: "finance".to_string(),
            name: "Finance".to_string(),
            description: "Budgeting, expenses, and financial reporting".to_string(),
            ai_context: "You assist employees with budgeting, expense reporting, \
                         and financial policy questions."
                .to_string(),
            blocked_keywords: vec![],
        },
        NewDepartment {
            key: "hr".to_string(),
            name: "Human Resources".to_string(),
            description: "Policies, benefits, and employee relations".to_string(),
            ai_context: "You assist employees with company policies, benefits, \
                         and workplace procedure questions."
                .to_string(),
            blocked_keywords: vec![],
        },
    ]
}
