//! Account registration and sign-in.

use crate::crypto::hash_password;
use crate::db::RelationalStore;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::validation::{validate_login, validate_registration, LoginForm, RegistrationForm, ValidationError};

pub const EMAIL_TAKEN: &str = "Email already registered";
pub const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Validate, check uniqueness, hash, then store. Returns the new user id.
///
/// The uniqueness check and the insert are separate store calls; a
/// concurrent duplicate is still refused by the UNIQUE constraint and
/// surfaces as a persistence failure.
pub fn register(
    store: &dyn RelationalStore,
    form: &RegistrationForm,
    iterations: u32,
) -> Result<i64, AppError> {
    let valid = validate_registration(form)?;

    if store.email_exists(&valid.email)? {
        return Err(ValidationError(EMAIL_TAKEN).into());
    }

    let user_id = store.create_user(&NewUser {
        first_name: valid.first_name,
        last_name: valid.last_name,
        email: valid.email,
        role: valid.role,
        password_hash: hash_password(&valid.password, iterations),
    })?;

    tracing::info!(user_id, role = %valid.role, "User registered");
    Ok(user_id)
}

/// Check credentials. Unknown email and wrong password share one message
/// and, with `iterations` matching the stored hashes, one cost.
pub fn login(store: &dyn RelationalStore, form: &LoginForm, iterations: u32) -> Result<User, AppError> {
    let credentials = validate_login(form)?;
    match store.authenticate(&credentials.email, &credentials.password, iterations)? {
        Some(user) => {
            tracing::info!(user_id = user.id, role = %user.role, "User signed in");
            Ok(user)
        }
        None => {
            tracing::info!("Sign-in rejected");
            Err(ValidationError(BAD_CREDENTIALS).into())
        }
    }
}
