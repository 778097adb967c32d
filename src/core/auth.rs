use crate::config::AuthConfig;
use crate::domain::model::{Operator, Participant};
use crate::domain::ports::ParticipantStore;
use crate::utils::crypto;
use crate::utils::error::{RaffleError, Result};
use crate::utils::validation::normalize_email;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub user: AdminUser,
}

pub struct AuthService {
    participants: Arc<dyn ParticipantStore>,
    secret: Vec<u8>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(participants: Arc<dyn ParticipantStore>, config: &AuthConfig) -> Self {
        Self {
            participants,
            secret: config.jwt_secret.as_bytes().to_vec(),
            access_ttl: Duration::minutes(config.access_token_minutes),
            refresh_ttl: Duration::days(config.refresh_token_days),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = normalize_email(email);
        let Some(participant) = self.participants.find_by_email(&email).await? else {
            tracing::info!(email = %email, "Login rejected: unknown email");
            return Err(RaffleError::unauthorized("Invalid credentials."));
        };

        let password_ok = participant
            .password_hash
            .as_deref()
            .is_some_and(|hash| crypto::verify_password(password, hash));
        if !password_ok {
            tracing::info!(email = %email, "Login rejected: wrong password");
            return Err(RaffleError::unauthorized("Invalid credentials."));
        }

        if !participant.is_admin || !participant.is_active {
            tracing::warn!(email = %email, "Login rejected: not an active administrator");
            return Err(RaffleError::forbidden("You do not have administrator permissions."));
        }

        let tokens = TokenPair {
            access: self.issue(&participant, TokenKind::Access)?,
            refresh: self.issue(&participant, TokenKind::Refresh)?,
        };
        tracing::info!(operator = %participant.email, "Administrator logged in");

        Ok(LoginOutcome {
            tokens,
            user: AdminUser {
                id: participant.id,
                email: participant.email,
                full_name: participant.full_name,
                is_admin: participant.is_admin,
            },
        })
    }

    /// Exchanges a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;
        let participant = self.load_admin(claims.sub).await?;
        self.issue(&participant, TokenKind::Access)
    }

    /// Resolves an `Authorization` header value to the operator it belongs to.
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<Operator> {
        let token = extract_bearer_token(authorization)
            .ok_or_else(|| RaffleError::unauthorized("Missing Authorization Bearer token"))?;
        let claims = self.decode(token, TokenKind::Access)?;
        let participant = self.load_admin(claims.sub).await?;
        Ok(Operator::from(&participant))
    }

    fn issue(&self, participant: &Participant, kind: TokenKind) -> Result<String> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: participant.id,
            email: participant.email.clone(),
            typ: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        crypto::encode_hs256(&self.secret, &claims)
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let claims: Claims = crypto::decode_hs256(&self.secret, token)?;
        if claims.typ != expected {
            return Err(RaffleError::TokenError {
                message: "Token has wrong type".to_string(),
            });
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(RaffleError::TokenError {
                message: "Token is expired".to_string(),
            });
        }
        Ok(claims)
    }

    async fn load_admin(&self, id: Uuid) -> Result<Participant> {
        let participant = self
            .participants
            .get(id)
            .await?
            .ok_or_else(|| RaffleError::forbidden("User no longer exists."))?;
        if !participant.is_admin || !participant.is_active {
            return Err(RaffleError::forbidden("You do not have administrator permissions."));
        }
        Ok(participant)
    }
}

pub fn extract_bearer_token(raw: Option<&str>) -> Option<&str> {
    let (scheme, rest) = raw?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}
