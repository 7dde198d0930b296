//! Shared types for the HTTP layer.

use std::sync::Arc;

use crate::core_state::CoreState;
use crate::error::AppError;
use crate::models::User;
use crate::session::{SessionContext, SessionStore};

// ═══════════════════════════════════════════════════════════
// Web context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware.
/// Wraps `CoreState` plus the session table.
#[derive(Clone)]
pub struct WebContext {
    pub core: Arc<CoreState>,
    pub sessions: Arc<SessionStore>,
}

impl WebContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        let sessions = SessionStore::new(&core.config.secret_key, core.config.session_idle);
        Self {
            core,
            sessions: Arc::new(sessions),
        }
    }

    /// The signed-in user, for page chrome. Lookup failures render as anonymous.
    pub fn viewer(&self, session: &SessionContext) -> Option<User> {
        let user_id = session.get_user_id()?;
        match self.core.relational().get_user_by_id(user_id) {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Viewer lookup failed");
                None
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Current user, injected by the guards
// ═══════════════════════════════════════════════════════════

/// Identity that passed a guard, inserted into request extensions.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: i64,
}

/// Parse a numeric path segment. Anything else is a missing patient.
pub fn parse_patient_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(AppError::NotFound("Patient"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_ids_must_be_positive_integers() {
        assert_eq!(parse_patient_id("42").unwrap(), 42);
        for bad in ["", "abc", "-1", "0", "4.2", "507f1f77bcf86cd799439011"] {
            assert!(matches!(parse_patient_id(bad), Err(AppError::NotFound("Patient"))), "{bad}");
        }
    }
}
