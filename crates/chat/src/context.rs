//! System-context builder.
//!
//! Renders the system-role content sent with every generation request: the
//! department's steering text, company and department identity lines, and the
//! fixed behavioral guidelines.

use deskbot_core::{AppError, AppResult};
use deskbot_store::Department;
use handlebars::Handlebars;
use std::collections::HashMap;

/// Template for the system-role content.
///
/// Deterministic given the department record and the configured company name.
const SYSTEM_CONTEXT_TEMPLATE: &str = "\
{{aiContext}}
Company: {{companyName}}
Department: {{departmentName}}
Important guidelines:
- Only answer questions related to company operations and this department
- Use professional language appropriate for internal company communication
- If asked about non-company topics, politely redirect to company-related matters
- Base responses on current information and best practices
- Be helpful but maintain confidentiality of sensitive information
";

/// Build the system-context string for a generation request.
pub fn build_system_context(department: &Department, company_name: &str) -> AppResult<String> {
    tracing::debug!("Building system context for department '{}'", department.key);

    let mut variables = HashMap::new();
    variables.insert("aiContext".to_string(), department.ai_context.clone());
    variables.insert("companyName".to_string(), company_name.to_string());
    variables.insert("departmentName".to_string(), department.name.clone());

    render_template(SYSTEM_CONTEXT_TEMPLATE, &variables)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("system-context", template)
        .map_err(|e| AppError::Other(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("system-context", &variables)
        .map_err(|e| AppError::Other(format!("Failed to render system context: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn department() -> Department {
        Department {
            id: 1,
            key: "finance".to_string(),
            name: "Finance".to_string(),
            description: String::new(),
            ai_context: "You help employees with budgeting and expense questions.".to_string(),
            blocked_keywords: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_context_contains_all_sections() {
        let context = build_system_context(&department(), "Ankit Solutions").unwrap();

        assert!(context.starts_with("You help employees with budgeting"));
        assert!(context.contains("Company: Ankit Solutions"));
        assert!(context.contains("Department: Finance"));
        assert!(context.contains("Important guidelines:"));
        assert!(context.contains("maintain confidentiality"));
    }

    #[test]
    fn test_context_is_deterministic() {
        let dept = department();
        let first = build_system_context(&dept, "Acme").unwrap();
        let second = build_system_context(&dept, "Acme").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_context_preserves_special_characters() {
        let mut dept = department();
        dept.ai_context = "Use <internal> terms & abbreviations.".to_string();

        let context = build_system_context(&dept, "Acme").unwrap();
        // HTML escaping is disabled
        assert!(context.contains("<internal> terms & abbreviations"));
    }
}
