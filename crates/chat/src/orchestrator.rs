//! Response orchestration.
//!
//! Given an admitted question, the orchestrator resolves the department,
//! builds the system context, calls the generation provider once, normalizes
//! the response, persists the exchange, and returns the outcome. A broken
//! provider never aborts the request: the degraded path substitutes a fixed
//! apology and the conversation record is written either way.

use crate::context::build_system_context;
use crate::types::{Outcome, MAX_CITATIONS};
use deskbot_core::{AppError, AppResult};
use deskbot_llm::{ChatRequest, GenerationClient};
use deskbot_store::{ChatStore, NewConversation};
use std::sync::Arc;

/// Fixed apology text for the degraded outcome.
pub const FALLBACK_MESSAGE: &str = "I apologize, but I'm experiencing technical difficulties. \
     Please try again later or contact your system administrator.";

/// Orchestrates one question end to end.
///
/// The generation client is injected at construction; there is no shared
/// process-wide client instance.
pub struct Orchestrator {
    client: Arc<dyn GenerationClient>,
    company_name: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl Orchestrator {
    /// Create an orchestrator with default generation settings.
    pub fn new(
        client: Arc<dyn GenerationClient>,
        company_name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            company_name: company_name.into(),
            model: model.into(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    /// Set the maximum tokens requested per call.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate an answer for an admitted question.
    ///
    /// Callers are responsible for access checks and admission; this method
    /// trusts that the question has been gated and only validates that the
    /// department key resolves.
    ///
    /// # Errors
    /// - `AppError::NotFound` when the department key does not resolve; no
    ///   record is written.
    /// - `AppError::Store` when persisting the record fails.
    ///
    /// Provider failures are not errors: they produce `Outcome::Degraded`.
    pub async fn generate(
        &self,
        store: &ChatStore,
        question_text: &str,
        department_key: &str,
        user_id: i64,
    ) -> AppResult<Outcome> {
        // 1. Resolve the department
        let department = store
            .find_department(department_key)?
            .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

        // 2. Build the system context
        let system_context = build_system_context(&department, &self.company_name)?;

        // 3. One provider call, with citations requested
        let request = ChatRequest::new(question_text, &self.model)
            .with_system(system_context)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_citations();

        tracing::info!(
            "Generating answer for user {} in department '{}'",
            user_id,
            department_key
        );

        // 4./5. Normalize success, absorb failure into the degraded outcome
        let outcome = match self.client.complete(&request).await {
            Ok(response) => {
                let mut citations = response.citations;
                citations.truncate(MAX_CITATIONS);
                Outcome::Success {
                    answer: response.content,
                    citations,
                }
            }
            Err(e) => {
                tracing::warn!("Provider call failed, returning degraded answer: {}", e);
                Outcome::Degraded {
                    answer: FALLBACK_MESSAGE.to_string(),
                }
            }
        };

        // 6. Persist exactly once, after the outcome is determined
        store.insert_conversation(&NewConversation {
            user_id,
            department: department_key.to_string(),
            user_message: question_text.to_string(),
            ai_response: outcome.answer().to_string(),
            citations: outcome.citations().to_vec(),
        })?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskbot_llm::{ChatResponse, Citation};
    use deskbot_store::{NewDepartment, NewUser};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted generation client for orchestrator tests.
    struct MockClient {
        result: Result<ChatResponse, String>,
        calls: AtomicUsize,
    }

    impl MockClient {
        fn succeeding(response: ChatResponse) -> Self {
            Self {
                result: Ok(response),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl GenerationClient for MockClient {
        fn provider_name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(AppError::Provider)
        }
    }

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
        store
            .insert_department(&NewDepartment {
                key: "finance".to_string(),
                name: "Finance".to_string(),
                description: String::new(),
                ai_context: "You help with budgeting questions.".to_string(),
                blocked_keywords: vec![],
            })
            .unwrap();
        (store, user_id)
    }

    fn response_with_citations(count: usize) -> ChatResponse {
        ChatResponse {
            content: "The policy allows it.".to_string(),
            model: "sonar".to_string(),
            citations: (0..count)
                .map(|i| Citation {
                    title: format!("Source {}", i),
                    url: format!("https://example.com/{}", i),
                    snippet: String::new(),
                })
                .collect(),
        }
    }

    fn orchestrator(client: Arc<dyn GenerationClient>) -> Orchestrator {
        Orchestrator::new(client, "Acme", "sonar")
    }

    #[tokio::test]
    async fn test_success_outcome_and_persistence() {
        let (store, user_id) = seeded_store();
        let client = Arc::new(MockClient::succeeding(response_with_citations(2)));
        let orch = orchestrator(client.clone());

        let outcome = orch
            .generate(&store, "What is the travel policy?", "finance", user_id)
            .await
            .unwrap();

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.answer(), "The policy allows it.");
        assert_eq!(outcome.citations().len(), 2);
        assert_eq!(client.call_count(), 1);

        // Exactly one record, matching the outcome
        let records = store.conversations_for_user(user_id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_message, "What is the travel policy?");
        assert_eq!(records[0].ai_response, "The policy allows it.");
        assert_eq!(records[0].citations.len(), 2);
        assert_eq!(records[0].department, "finance");
    }

    #[tokio::test]
    async fn test_citations_capped_in_provider_order() {
        let (store, user_id) = seeded_store();
        let client = Arc::new(MockClient::succeeding(response_with_citations(8)));
        let orch = orchestrator(client);

        let outcome = orch
            .generate(&store, "budget question", "finance", user_id)
            .await
            .unwrap();

        let citations = outcome.citations();
        assert_eq!(citations.len(), MAX_CITATIONS);
        assert_eq!(citations[0].title, "Source 0");
        assert_eq!(citations[4].title, "Source 4");
    }

    #[tokio::test]
    async fn test_provider_failure_yields_degraded_outcome() {
        let (store, user_id) = seeded_store();
        let client = Arc::new(MockClient::failing("connection timed out"));
        let orch = orchestrator(client);

        let outcome = orch
            .generate(&store, "expense report question", "finance", user_id)
            .await
            .unwrap();

        assert!(outcome.is_degraded());
        assert_eq!(outcome.answer(), FALLBACK_MESSAGE);
        assert!(outcome.citations().is_empty());

        // The record is still written, with the apology and no citations
        let records = store.conversations_for_user(user_id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ai_response, FALLBACK_MESSAGE);
        assert!(records[0].citations.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_department_fails_without_record_or_call() {
        let (store, user_id) = seeded_store();
        let client = Arc::new(MockClient::succeeding(response_with_citations(1)));
        let orch = orchestrator(client.clone());

        let result = orch
            .generate(&store, "budget question", "engineering", user_id)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(client.call_count(), 0);
        assert!(store.conversations_for_user(user_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_record_per_request() {
        let (store, user_id) = seeded_store();
        let client = Arc::new(MockClient::succeeding(response_with_citations(0)));
        let orch = orchestrator(client);

        orch.generate(&store, "first budget question", "finance", user_id)
            .await
            .unwrap();
        orch.generate(&store, "second budget question", "finance", user_id)
            .await
            .unwrap();

        assert_eq!(store.conversations_for_user(user_id).unwrap().len(), 2);
    }
}
