//! Department access check.
//!
//! Runs before admission and orchestration; a user may only chat within
//! departments their grants cover.

use deskbot_core::{AppError, AppResult};
use deskbot_store::User;

/// Verify that the user's department grants cover the requested department.
///
/// The grant `"all"` covers every department.
///
/// # Errors
/// `AppError::AccessDenied` when the grant list does not cover the key.
pub fn ensure_department_access(user: &User, department_key: &str) -> AppResult<()> {
    if user.has_department_grant(department_key) {
        return Ok(());
    }

    tracing::info!(
        "User '{}' denied access to department '{}'",
        user.username,
        department_key
    );

    Err(AppError::AccessDenied(
        "Access denied to this department".to_string(),
    ))
}
