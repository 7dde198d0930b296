//! Route access checks.
//!
//! Two requirements exist:
//! 1. Authenticated: the session carries a user id
//! 2. Role: authenticated, and that user's stored role equals the required one
//!
//! The role is resolved from the credential store on every check, never
//! cached in the session. Any failure to resolve it denies access.

use crate::db::RelationalStore;
use crate::models::enums::Role;
use crate::session::FlashLevel;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// What a route demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Role(Role),
}

/// Why a caller was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No identity in the session.
    LoginRequired,
    /// Identity present, but its role is missing or different.
    RoleRequired(Role),
}

impl Denial {
    pub fn message(self) -> &'static str {
        match self {
            Self::LoginRequired => "Please log in to continue",
            Self::RoleRequired(Role::Admin) => "Admin access required",
            Self::RoleRequired(Role::Doctor) => "Doctor access required",
        }
    }

    pub fn level(self) -> FlashLevel {
        match self {
            Self::LoginRequired => FlashLevel::Warning,
            Self::RoleRequired(_) => FlashLevel::Danger,
        }
    }

    /// Where the caller is sent instead of the handler.
    pub fn redirect_to(self) -> &'static str {
        match self {
            Self::LoginRequired => "/login",
            Self::RoleRequired(_) => "/",
        }
    }
}

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow { user_id: i64 },
    Deny(Denial),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

// ═══════════════════════════════════════════════════════════
// Access check
// ═══════════════════════════════════════════════════════════

/// Decide whether the session identity satisfies `requirement`.
///
/// Never fails: an unknown user or a store error both deny, the latter
/// with a logged error.
pub fn check_access(
    user_id: Option<i64>,
    store: &dyn RelationalStore,
    requirement: Requirement,
) -> AccessDecision {
    let Some(user_id) = user_id else {
        return AccessDecision::Deny(Denial::LoginRequired);
    };

    let required = match requirement {
        Requirement::Authenticated => return AccessDecision::Allow { user_id },
        Requirement::Role(role) => role,
    };

    match resolve_role(store, user_id) {
        Some(role) if role == required => AccessDecision::Allow { user_id },
        _ => AccessDecision::Deny(Denial::RoleRequired(required)),
    }
}

/// Apply requirements in order, stopping at the first denial.
///
/// `[Authenticated, Role(r)]` decides exactly like `[Role(r)]`.
pub fn check_all(
    user_id: Option<i64>,
    store: &dyn RelationalStore,
    requirements: &[Requirement],
) -> AccessDecision {
    let mut decision = match user_id {
        Some(user_id) => AccessDecision::Allow { user_id },
        None => AccessDecision::Deny(Denial::LoginRequired),
    };
    for requirement in requirements {
        decision = check_access(user_id, store, *requirement);
        if !decision.is_allowed() {
            break;
        }
    }
    decision
}

fn resolve_role(store: &dyn RelationalStore, user_id: i64) -> Option<Role> {
    match store.get_user_by_id(user_id) {
        Ok(Some(user)) => Some(user.role),
        Ok(None) => {
            tracing::info!(user_id, "Session refers to a user that no longer exists");
            None
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "Role lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseError, SqliteRelationalStore};
    use crate::models::*;

    fn add_user(store: &SqliteRelationalStore, role: Role) -> i64 {
        store
            .create_user(&NewUser {
                first_name: "Test".into(),
                last_name: role.as_str().into(),
                email: format!("{}@example.com", role.as_str()),
                role,
                password_hash: "unused".into(),
            })
            .unwrap()
    }

    fn store_with_users() -> (SqliteRelationalStore, i64, i64, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRelationalStore::open(dir.path().join("records.db")).unwrap();
        let admin = add_user(&store, Role::Admin);
        let doctor = add_user(&store, Role::Doctor);
        (store, admin, doctor, dir)
    }

    #[test]
    fn anonymous_needs_login_for_everything() {
        let (store, _, _, _dir) = store_with_users();
        for requirement in [
            Requirement::Authenticated,
            Requirement::Role(Role::Admin),
            Requirement::Role(Role::Doctor),
        ] {
            assert_eq!(
                check_access(None, &store, requirement),
                AccessDecision::Deny(Denial::LoginRequired)
            );
        }
    }

    #[test]
    fn any_identity_is_authenticated() {
        let (store, admin, _, _dir) = store_with_users();
        assert_eq!(
            check_access(Some(admin), &store, Requirement::Authenticated),
            AccessDecision::Allow { user_id: admin }
        );
    }

    #[test]
    fn role_must_match_exactly() {
        let (store, admin, doctor, _dir) = store_with_users();
        assert!(check_access(Some(admin), &store, Requirement::Role(Role::Admin)).is_allowed());
        assert!(check_access(Some(doctor), &store, Requirement::Role(Role::Doctor)).is_allowed());
        assert_eq!(
            check_access(Some(doctor), &store, Requirement::Role(Role::Admin)),
            AccessDecision::Deny(Denial::RoleRequired(Role::Admin))
        );
        assert_eq!(
            check_access(Some(admin), &store, Requirement::Role(Role::Doctor)),
            AccessDecision::Deny(Denial::RoleRequired(Role::Doctor))
        );
    }

    #[test]
    fn vanished_user_is_denied_not_faulted() {
        let (store, _, _, _dir) = store_with_users();
        assert_eq!(
            check_access(Some(9_999), &store, Requirement::Role(Role::Admin)),
            AccessDecision::Deny(Denial::RoleRequired(Role::Admin))
        );
    }

    struct BrokenStore;

    impl RelationalStore for BrokenStore {
        fn email_exists(&self, _: &str) -> Result<bool, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn create_user(&self, _: &NewUser) -> Result<i64, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn get_user_by_email(&self, _: &str) -> Result<Option<User>, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn get_user_by_id(&self, _: i64) -> Result<Option<User>, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn create_patient(&self, _: &NewPatient) -> Result<i64, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn get_all_patients(&self) -> Result<Vec<Patient>, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn get_patient_by_id(&self, _: i64) -> Result<Option<Patient>, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn update_patient(&self, _: i64, _: &PatientUpdate) -> Result<bool, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
        fn delete_patient(&self, _: i64) -> Result<bool, DatabaseError> {
            Err(DatabaseError::ConstraintViolation("offline".into()))
        }
    }

    #[test]
    fn store_failure_denies() {
        assert_eq!(
            check_access(Some(1), &BrokenStore, Requirement::Role(Role::Doctor)),
            AccessDecision::Deny(Denial::RoleRequired(Role::Doctor))
        );
        // Authentication alone never touches the store.
        assert!(check_access(Some(1), &BrokenStore, Requirement::Authenticated).is_allowed());
    }

    #[test]
    fn stacking_auth_under_role_is_idempotent() {
        let (store, admin, doctor, _dir) = store_with_users();
        let stacked = [Requirement::Authenticated, Requirement::Role(Role::Admin)];
        let alone = [Requirement::Role(Role::Admin)];
        for user in [None, Some(admin), Some(doctor), Some(9_999)] {
            assert_eq!(
                check_all(user, &store, &stacked),
                check_all(user, &store, &alone),
                "user {user:?}"
            );
        }
    }

    #[test]
    fn denials_carry_notice_and_destination() {
        assert_eq!(Denial::LoginRequired.redirect_to(), "/login");
        assert_eq!(Denial::LoginRequired.message(), "Please log in to continue");
        assert_eq!(Denial::RoleRequired(Role::Admin).redirect_to(), "/");
        assert_eq!(Denial::RoleRequired(Role::Doctor).message(), "Doctor access required");
    }
}
