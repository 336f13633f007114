//! Registration, login, and identity endpoints.

use axum::extract::State;
use axum::Json;
use optiondesk_core::error::DeskError;
use optiondesk_data::models::UserRecord;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::UserView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

fn validate_registration(request: &RegisterRequest) -> Result<(), DeskError> {
    if request.username.len() < 3 || request.username.len() > 32 {
        return Err(DeskError::Validation(
            "username must be 3 to 32 characters".to_string(),
        ));
    }
    if !request
        .username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DeskError::Validation(
            "username may only contain letters, digits, and underscores".to_string(),
        ));
    }
    if !request.email.contains('@') || request.email.len() > 254 {
        return Err(DeskError::Validation("invalid email address".to_string()));
    }
    if request.password.len() < 8 {
        return Err(DeskError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    validate_registration(&request)?;

    if state
        .repos
        .users
        .get_by_username(&request.username)
        .await?
        .is_some()
    {
        return Err(DeskError::Validation("username already taken".to_string()).into());
    }
    if state
        .repos
        .users
        .get_by_email(&request.email)
        .await?
        .is_some()
    {
        return Err(DeskError::Validation("email already registered".to_string()).into());
    }

    let hash = state.auth.hash_password(&request.password)?;
    let user = UserRecord::new(request.username, request.email, hash);
    state.repos.users.insert(&user).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");

    let token = state.auth.issue_token(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .repos
        .users
        .get_by_username(&request.username)
        .await?
        .ok_or_else(|| DeskError::Unauthorized("invalid credentials".to_string()))?;

    state
        .auth
        .verify_password(&request.password, &user.password_hash)?;

    if user.status == "banned" {
        return Err(DeskError::AccountRestricted {
            user_id: user.id,
            status: user.status,
        }
        .into());
    }

    let token = state.auth.issue_token(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserView>> {
    let user = state
        .repos
        .users
        .get_by_id(auth.user_id)
        .await?
        .ok_or(DeskError::NotFound {
            kind: "user",
            id: auth.user_id.to_string(),
        })?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn registration_validation() {
        assert!(validate_registration(&request("alice", "a@b.com", "longenough")).is_ok());
        assert!(validate_registration(&request("al", "a@b.com", "longenough")).is_err());
        assert!(validate_registration(&request("alice!", "a@b.com", "longenough")).is_err());
        assert!(validate_registration(&request("alice", "not-an-email", "longenough")).is_err());
        assert!(validate_registration(&request("alice", "a@b.com", "short")).is_err());
    }
}
