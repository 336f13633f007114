//! JWT issuance and password hashing.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use optiondesk_core::config::AuthConfig;
use optiondesk_core::error::{DeskError, DeskResult};
use optiondesk_core::types::UserRole;
use optiondesk_data::models::UserRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Role at issuance time.
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token and password operations, configured once at startup.
#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    token_ttl_secs: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Creates the service from the auth section of the app config.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            token_ttl_secs: config.token_ttl_secs,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Issues a signed token for a user.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue_token(&self, user: &UserRecord) -> DeskResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.clone(),
            iat: now,
            exp: now + self.token_ttl_secs,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| DeskError::Internal(e.into()))
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    /// Returns `Unauthorized` for expired, malformed, or forged tokens.
    pub fn verify_token(&self, token: &str) -> DeskResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| DeskError::Unauthorized(format!("invalid token: {e}")))
    }

    /// Hashes a password with the configured cost.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash_password(&self, password: &str) -> DeskResult<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(|e| DeskError::Internal(e.into()))
    }

    /// Checks a password against a stored hash.
    ///
    /// # Errors
    /// Returns `Unauthorized` on mismatch.
    pub fn verify_password(&self, password: &str, hash: &str) -> DeskResult<()> {
        let ok = bcrypt::verify(password, hash).map_err(|e| DeskError::Internal(e.into()))?;
        if ok {
            Ok(())
        } else {
            Err(DeskError::Unauthorized("invalid credentials".to_string()))
        }
    }
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Authenticated caller with an admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

fn bearer_token(parts: &Parts) -> DeskResult<&str> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| DeskError::Unauthorized("missing authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| DeskError::Unauthorized("expected bearer token".to_string()))
}

/// Resolves verified claims into an [`AuthUser`].
///
/// # Errors
/// Returns `Unauthorized` if the subject is not a valid user id.
pub fn user_from_claims(claims: &Claims) -> DeskResult<AuthUser> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| DeskError::Unauthorized("invalid token subject".to_string()))?;
    let role = UserRole::parse(&claims.role).unwrap_or_default();
    Ok(AuthUser { user_id, role })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.auth.verify_token(token)?;
        Ok(user_from_claims(&claims)?)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(ApiError(DeskError::Forbidden(
                "admin role required".to_string(),
            )));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService {
            secret: "test-secret".to_string(),
            token_ttl_secs: 3600,
            // Minimum cost keeps the test fast.
            bcrypt_cost: 4,
        }
    }

    fn sample_user() -> UserRecord {
        UserRecord::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        )
    }

    #[test]
    fn token_roundtrip() {
        let auth = service();
        let user = sample_user();

        let token = auth.issue_token(&user).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);

        let resolved = user_from_claims(&claims).unwrap();
        assert_eq!(resolved.user_id, user.id);
        assert_eq!(resolved.role, UserRole::User);
    }

    #[test]
    fn forged_token_is_rejected() {
        let auth = service();
        let other = AuthService {
            secret: "other-secret".to_string(),
            token_ttl_secs: 3600,
            bcrypt_cost: 4,
        };

        let token = other.issue_token(&sample_user()).unwrap();
        let err = auth.verify_token(&token).unwrap_err();
        assert!(matches!(err, DeskError::Unauthorized(_)));
    }

    #[test]
    fn password_hash_roundtrip() {
        let auth = service();
        let hash = auth.hash_password("hunter2").unwrap();

        assert!(auth.verify_password("hunter2", &hash).is_ok());
        assert!(matches!(
            auth.verify_password("wrong", &hash),
            Err(DeskError::Unauthorized(_))
        ));
    }
}
