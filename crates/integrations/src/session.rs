use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ISSUER: &str = "lead-intake";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSession {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("failed to issue session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Gatekeeper for the staff console. Token format and credential checks are
/// entirely up to the implementation.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_session(&self, token: &str) -> Option<StaffSession>;
    async fn sign_in(&self, username: &str, password: &str) -> Result<String, SessionError>;
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: i64,
    pub staff_username: String,
    pub staff_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String,
    iat: i64,
    exp: i64,
}

/// Single staff account, HS256-signed session tokens.
pub struct JwtSessionProvider {
    cfg: SessionConfig,
}

impl JwtSessionProvider {
    pub fn new(cfg: SessionConfig) -> Self {
        Self { cfg }
    }

    pub fn issue_token(&self, username: &str) -> Result<String, SessionError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.cfg.ttl_seconds);
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.secret.as_bytes()),
        )?)
    }

    fn credentials_match(&self, username: &str, password: &str) -> bool {
        !self.cfg.staff_password.is_empty()
            && username == self.cfg.staff_username
            && password == self.cfg.staff_password
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn get_session(&self, token: &str) -> Option<StaffSession> {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data,
            Err(error) => {
                debug!(%error, "rejected session token");
                return None;
            }
        };

        let expires_at = Utc.timestamp_opt(data.claims.exp, 0).single()?;
        Some(StaffSession {
            username: data.claims.sub,
            expires_at,
        })
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<String, SessionError> {
        if !self.credentials_match(username, password) {
            warn!(%username, "staff sign-in rejected");
            return Err(SessionError::InvalidCredentials);
        }
        self.issue_token(username)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
