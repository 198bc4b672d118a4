//! CLI command implementations.
//!
//! Commands validate raw input (email shape, province, date-time) before it
//! reaches the app state, which trusts what it is given.

pub mod account;
pub mod booking;
pub mod output;
pub mod secret;

use homeservice_app::{AppError, AppState};
use homeservice_app::models::UserProfile;

/// The signed-in profile, or an error telling the user to sign in.
async fn require_user(state: &AppState) -> Result<UserProfile, AppError> {
    state
        .current_user()
        .await
        .ok_or_else(|| AppError::Unauthorized("Sign in first with `hs-cli login`".to_string()))
}
