//! Registration and login flows. Credentials are validated locally before any request.

use crate::api::{ApiClient, LoginRequest, RegisterRequest, UserProfile};
use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;

/// Backend `MIN_PASSWORD_LENGTH`.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Backend `MAX_PASSWORD_LENGTH`. Both bounds count characters, not bytes.
pub const MAX_PASSWORD_LENGTH: usize = 72;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<RegisterRequest, AppError> {
    let username = username.trim();
    let email = email.trim();
    let password = password.trim();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::invalid_input("All fields are required"));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(AppError::invalid_input(
            "Please enter a valid email address",
        ));
    }

    Ok(RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_login(username: &str, password: &str) -> Result<LoginRequest, AppError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::invalid_input("Username and password are required"));
    }

    Ok(LoginRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
    })
}

pub async fn register(
    api: &ApiClient,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserProfile, AppError> {
    let request = validate_registration(username, email, password)?;
    let profile = api.register(&request).await?;
    tracing::info!(username = %profile.username, "registered account");
    Ok(profile)
}

/// Logs in and stores the returned bearer credential in the session's token store.
pub async fn login(api: &ApiClient, username: &str, password: &str) -> Result<(), AppError> {
    let request = validate_login(username, password)?;
    let token = api.login(&request).await?;
    if token.access_token.trim().is_empty() {
        return Err(AppError::invalid_data("login response carried no access_token"));
    }
    api.session().tokens().save(&token.access_token)?;
    tracing::info!(username = %request.username, "logged in");
    Ok(())
}

pub fn logout(api: &ApiClient) -> Result<(), AppError> {
    api.session().tokens().clear()?;
    tracing::info!("logged out");
    Ok(())
}
