// auth/mod.rs - Family sessions and member credentials
//
// The provider bearer token identifies the account owner. Family members log
// in with a username/password stored in family.json and receive a signed
// session token, sent back on each request as X-Family-Token.

pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FamilyMember, Role};

pub use password::{hash_password, verify_password, PasswordCheck, PasswordError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_member(member: &FamilyMember, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: member.id.clone(),
            username: member.username.clone(),
            role: member.role,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret not configured")]
    MissingSecret,

    #[error("invalid session token: {0}")]
    Invalid(String),

    #[error("session token generation error: {0}")]
    Encoding(String),
}

/// Verified family session, injected into request extensions
#[derive(Debug, Clone)]
pub struct FamilySession {
    pub member_id: String,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for FamilySession {
    fn from(claims: Claims) -> Self {
        Self {
            member_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl FamilySession {
    /// Parents can reach every member's data, everyone else only their own
    pub fn can_access(&self, member: &str) -> bool {
        self.role == Role::Parent || self.username == member
    }
}

pub fn issue_session(claims: &Claims, secret: &str) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| SessionError::Encoding(e.to_string()))
}

pub fn verify_session(token: &str, secret: &str) -> Result<FamilySession, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| SessionError::Invalid(e.to_string()))?;

    Ok(token_data.claims.into())
}
