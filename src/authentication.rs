use crate::errors::RequestError;
use crate::models::{Role, User};
use crate::session::current_user;
use crate::AppState;
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

pub const JWT_EXPIRY_DURATION: time::Duration = time::Duration::days(7);

/// Identity carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    #[serde(flatten)]
    identity: SessionClaims,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: jsonwebtoken::EncodingKey,
    decoding_key: jsonwebtoken::DecodingKey,
    ttl: time::Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: time::Duration) -> Self {
        Self {
            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, identity: &SessionClaims) -> Result<String> {
        let now = OffsetDateTime::now_utc();
        let claim = AuthClaim {
            identity: identity.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claim, &self.encoding_key)
            .context("Failed to generate jwt token")
    }

    /// Decode a token. Malformed, expired and mis-signed tokens all give `None`.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let token_data = jsonwebtoken::decode::<AuthClaim>(
            token,
            &self.decoding_key,
            &jsonwebtoken::Validation::default(),
        )
        .map_err(|e| tracing::debug!(error = %e, "Rejected session token"))
        .ok()?;
        let claim = token_data.claims;
        if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
            return None;
        }
        Some(claim.identity)
    }
}

impl SessionClaims {
    pub fn for_user(user: &User) -> Self {
        SessionClaims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// The session identity, if the request carries a valid cookie.
pub struct MaybeUser(pub Option<SessionClaims>);

impl MaybeUser {
    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|a| a.user_id)
    }
}

/// A request that must carry a valid session; rejects with 401 otherwise.
pub struct AuthUser(pub SessionClaims);

/// A request from a user whose stored role is `admin`.
pub struct AdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = RequestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(MaybeUser(current_user(&parts.headers, &state.tokens)))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = RequestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        match current_user(&parts.headers, &state.tokens) {
            Some(claims) => Ok(AuthUser(claims)),
            None => Err(RequestError::NotAuthorized),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = RequestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let session = current_user(&parts.headers, &state.tokens);
        let user = require_admin(&state.pool, session.as_ref()).await?;
        Ok(AdminUser(user))
    }
}

/// Gate for admin actions. The stored role wins over the role in the token.
pub async fn require_admin(
    pool: &SqlitePool,
    session: Option<&SessionClaims>,
) -> Result<User, RequestError> {
    let session = session.ok_or(RequestError::NotAuthorized)?;
    let user = crate::db_helpers::get_user_by_id(pool, session.user_id).await?;
    match user {
        Some(user) if user.is_admin() => Ok(user),
        _ => Err(RequestError::Forbidden("Forbidden")),
    }
}

pub async fn verify_password_argon2(password: String, hash: &str) -> Result<bool> {
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Stored password hash is malformed"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionClaims {
        SessionClaims {
            user_id: 42,
            email: "hanako@example.com".to_string(),
            role: Role::General,
        }
    }

    #[test]
    fn issued_token_verifies_to_the_same_identity() {
        let tokens = TokenService::new("test-secret", JWT_EXPIRY_DURATION);
        let token = tokens.issue(&identity()).expect("token should be issued");
        assert_eq!(tokens.verify(&token), Some(identity()));
    }

    #[test]
    fn token_payload_uses_camel_case_fields() {
        let claim = AuthClaim {
            identity: identity(),
            iat: 0,
            exp: 1,
        };
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["userId"], 42);
        assert_eq!(json["email"], "hanako@example.com");
        assert_eq!(json["role"], "general");
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let issuer = TokenService::new("secret-alpha", JWT_EXPIRY_DURATION);
        let verifier = TokenService::new("secret-bravo", JWT_EXPIRY_DURATION);
        let token = issuer.issue(&identity()).unwrap();
        assert_eq!(verifier.verify(&token), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the default 60 second leeway.
        let tokens = TokenService::new("test-secret", time::Duration::minutes(-10));
        let token = tokens.issue(&identity()).unwrap();
        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn garbage_is_rejected_without_panicking() {
        let tokens = TokenService::new("test-secret", JWT_EXPIRY_DURATION);
        assert_eq!(tokens.verify(""), None);
        assert_eq!(tokens.verify("not.a.jwt"), None);
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password_argon2("password123".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password_argon2("password123".to_string(), &hash)
            .await
            .unwrap());
        assert!(!verify_password_argon2("wrong".to_string(), &hash)
            .await
            .unwrap());
    }
}
