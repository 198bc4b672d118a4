//! Account and session commands.
//!
//! # Usage
//!
//! ```bash
//! hs-cli register -n "Ada Lovelace" -e ada@example.com
//! hs-cli login -e ada@example.com
//! hs-cli profile -p 555-0199
//! hs-cli change-email ada.l@example.com
//! hs-cli change-password
//! hs-cli logout
//! ```

use secrecy::{ExposeSecret, SecretString};

use homeservice_app::models::{NewAccount, UserProfile};
use homeservice_app::services::AccountError;
use homeservice_app::{AppError, AppState};
use homeservice_core::NormalizedEmail;

use super::{output, require_user};

/// Register a new account and sign it in.
///
/// # Errors
///
/// Returns an error if the email is malformed or already registered, or the
/// password is empty.
pub async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    phone: &str,
    password: &SecretString,
) -> Result<(), AppError> {
    let email = NormalizedEmail::parse(email)?;
    if password.expose_secret().is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".to_string()));
    }
    if state.lookup(email.as_str()).await.is_some() {
        return Err(AccountError::DuplicateEmail(email).into());
    }

    let profile = state
        .register(NewAccount::new(
            name.trim(),
            email.as_str(),
            phone.trim(),
            password.expose_secret(),
        ))
        .await;

    tracing::info!(email = %profile.email, "Account created");
    output::line(format_args!("Welcome, {}! You are signed in.", profile.name));
    Ok(())
}

/// Sign in with email and password.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when the credentials do not match.
pub async fn login(state: &AppState, email: &str, password: &SecretString) -> Result<(), AppError> {
    let profile = state
        .sign_in(email.trim(), password.expose_secret())
        .await
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    output::line(format_args!("Signed in as {}", profile.email));
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Never fails; returns `Result` for symmetry with the other commands.
pub async fn logout(state: &AppState) -> Result<(), AppError> {
    if state.current_user().await.is_none() {
        output::line("Not signed in");
        return Ok(());
    }
    state.log_out().await;
    output::line("Signed out");
    Ok(())
}

/// Show the signed-in account.
///
/// # Errors
///
/// Never fails; returns `Result` for symmetry with the other commands.
pub async fn whoami(state: &AppState) -> Result<(), AppError> {
    match state.current_user().await {
        Some(profile) => print_profile(&profile),
        None => output::line("Not signed in"),
    }
    Ok(())
}

/// Update name and/or phone of the signed-in account.
///
/// # Errors
///
/// Returns an error if nobody is signed in or nothing was given to change.
pub async fn update_profile(
    state: &AppState,
    name: Option<String>,
    phone: Option<String>,
) -> Result<(), AppError> {
    let current = require_user(state).await?;
    if name.is_none() && phone.is_none() {
        return Err(AppError::BadRequest(
            "Nothing to update; pass --name and/or --phone".to_string(),
        ));
    }

    let name = name.map_or(current.name, |n| n.trim().to_owned());
    let phone = phone.map_or(current.phone, |p| p.trim().to_owned());
    state
        .update_profile(current.email.as_str(), &name, &phone)
        .await;

    output::line("Profile updated");
    Ok(())
}

/// Change the email of the signed-in account.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the email is malformed, or it
/// belongs to another account.
pub async fn change_email(state: &AppState, new_email: &str) -> Result<(), AppError> {
    let current = require_user(state).await?;
    let new_email = NormalizedEmail::parse(new_email)?;

    state
        .update_email_and_password(current.email.as_str(), new_email.as_str(), None)
        .await?;

    output::line(format_args!("Email changed to {new_email}"));
    Ok(())
}

/// Change the password of the signed-in account.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the current password is wrong,
/// or the new one is empty.
pub async fn change_password(
    state: &AppState,
    current_password: &SecretString,
    new_password: &SecretString,
) -> Result<(), AppError> {
    let current = require_user(state).await?;
    if !state
        .validate_credentials(current.email.as_str(), current_password.expose_secret())
        .await
    {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }
    if new_password.expose_secret().is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".to_string()));
    }

    state
        .update_email_and_password(
            current.email.as_str(),
            current.email.as_str(),
            Some(new_password.expose_secret()),
        )
        .await?;

    output::line("Password changed");
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    output::line(format_args!("Name:  {}", profile.name));
    output::line(format_args!("Email: {}", profile.email));
    if !profile.phone.is_empty() {
        output::line(format_args!("Phone: {}", profile.phone));
    }
}
