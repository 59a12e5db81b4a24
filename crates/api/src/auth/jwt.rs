//! HS256 access tokens.
//!
//! The account id travels in `sub`. There are no refresh tokens: a client
//! logs in again once `exp` passes.

use chrono::Utc;
use gigledger_core::status::UserRole;
use gigledger_core::types::DbId;
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token lifetime when `JWT_ACCESS_EXPIRY_MINS` is unset: one day.
pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60 * 24;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: DbId,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
    /// Random per-token id, so two tokens issued in the same second differ.
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

impl JwtConfig {
    /// Token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    pub fn issue(&self, user_id: DbId, role: UserRole) -> Result<IssuedToken, JwtError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            exp: iat + self.expires_in(),
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(IssuedToken {
            token,
            expires_in: self.expires_in(),
        })
    }

    /// Decode a token, checking its signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}
