//! Sign-in, sign-up and logout
//!
//! Forms are validated locally before anything is sent. A token in the
//! response replaces the session's token; logout always ends the local
//! session, whatever the server says.

use crate::api::TweenApi;
use crate::error::{ClientResult, ValidationError};
use crate::models::{AuthResponse, Credentials};
use crate::session::Session;

pub const MIN_PASSWORD_LEN: usize = 6;
const STRONG_PASSWORD_LEN: usize = 10;

/// Fallback texts when the server gives no reason
pub const SIGN_IN_FAILED: &str = "Sign in failed";
pub const SIGN_UP_FAILED: &str = "Sign up failed";
pub const LOGOUT_FAILED: &str = "Logout failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Empty,
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn label(self) -> &'static str {
        match self {
            PasswordStrength::Empty => "",
            PasswordStrength::Weak => "Weak password",
            PasswordStrength::Medium => "Medium password",
            PasswordStrength::Strong => "Strong password",
        }
    }

    /// CSS modifier for the strength meter
    pub fn class(self) -> &'static str {
        match self {
            PasswordStrength::Empty => "",
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        }
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    match password.chars().count() {
        0 => PasswordStrength::Empty,
        n if n < MIN_PASSWORD_LEN => PasswordStrength::Weak,
        n if n < STRONG_PASSWORD_LEN => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

/// Both fields filled; the login is sent trimmed
pub fn validate_sign_in(login: &str, password: &str) -> Result<Credentials, ValidationError> {
    if login.trim().is_empty() || password.trim().is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(Credentials {
        login: login.trim().to_string(),
        password: password.to_string(),
    })
}

/// Sign-in rules plus a minimum length and a matching confirmation
pub fn validate_sign_up(
    login: &str,
    password: &str,
    confirm: &str,
) -> Result<Credentials, ValidationError> {
    let credentials = validate_sign_in(login, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(credentials)
}

fn store_token(session: &Session, response: &AuthResponse) -> ClientResult<()> {
    if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
        session.set(token)?;
    }
    Ok(())
}

pub async fn sign_in<A: TweenApi + ?Sized>(
    api: &A,
    session: &Session,
    login: &str,
    password: &str,
) -> ClientResult<AuthResponse> {
    let credentials = validate_sign_in(login, password)?;
    let response = api.sign_in(&credentials).await?;
    store_token(session, &response)?;
    tracing::info!(login = %credentials.login, "Signed in");
    Ok(response)
}

pub async fn sign_up<A: TweenApi + ?Sized>(
    api: &A,
    session: &Session,
    login: &str,
    password: &str,
    confirm: &str,
) -> ClientResult<AuthResponse> {
    let credentials = validate_sign_up(login, password, confirm)?;
    let response = api.sign_up(&credentials).await?;
    store_token(session, &response)?;
    tracing::info!(login = %credentials.login, "Signed up");
    Ok(response)
}

/// Tell the server, then drop the local session either way
///
/// Returns the server error, if any, after the session is cleared.
pub async fn logout<A: TweenApi + ?Sized>(api: &A, session: &Session) -> ClientResult<()> {
    let result = api.logout().await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Server logout failed, clearing session anyway");
    }
    session.clear()?;
    result
}
