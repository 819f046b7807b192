//! Chat command handler.
//!
//! Runs the full pipeline for one question: user lookup, access check,
//! admission filter, orchestration, and output.

use clap::Args;
use deskbot_chat::{ensure_department_access, is_allowed, Orchestrator, REJECTION_MESSAGE};
use deskbot_core::{config::AppConfig, AppError, AppResult};
use deskbot_llm::create_client;
use deskbot_store::ChatStore;

/// Ask a question within a department
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// The question to ask
    pub question: String,

    /// Username asking the question
    #[arg(short, long)]
    pub user: String,

    /// Department key to chat within
    #[arg(short, long)]
    pub department: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command for department '{}'", self.department);

        let store = ChatStore::open(&config.database)?;

        // 1. Resolve the user
        let user = store
            .find_user(&self.user)?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", self.user)))?;

        // 2. Access check before anything else
        ensure_department_access(&user, &self.department)?;

        // 3. Resolve the department for its blocklist
        let department = store
            .find_department(&self.department)?
            .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

        // 4. Admission filter; rejection short-circuits before any provider call
        if !is_allowed(&self.question, &department.blocked_keywords) {
            tracing::info!("Question rejected by admission filter");
            return Err(AppError::AdmissionRejected(REJECTION_MESSAGE.to_string()));
        }

        // 5. Construct the generation client explicitly
        config.validate()?;
        let api_key = config.resolve_api_key();
        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            api_key.as_deref(),
            config.timeout_secs,
        )
        .map_err(AppError::Config)?;

        let orchestrator = Orchestrator::new(client, &config.company_name, &config.model)
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature);

        // 6. Orchestrate: context build, provider call, persistence
        let outcome = orchestrator
            .generate(&store, &self.question, &self.department, user.id)
            .await?;

        let reply = outcome.into_reply(&config.reported_model);

        if self.json {
            let json = serde_json::to_string_pretty(&reply)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", reply.answer);

            if !reply.citations.is_empty() {
                println!();
                println!("Sources:");
                for citation in &reply.citations {
                    println!("- {} ({})", citation.title, citation.url);
                }
            }
        }

        Ok(())
    }
}
