//! Moderator credentials: signed tokens issued by the board API.
//!
//! The panel never verifies the signature (the board API does that on every
//! call). It only reads the claims to learn who is signed in and when the
//! token stops being usable.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("token must have three dot-separated segments, found {0}")]
    Segments(usize),
    #[error("token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token claims are not valid JSON: {0}")]
    Claims(#[from] serde_json::Error),
    #[error("token expiry `{0}` is out of range")]
    Expiry(i64),
}

#[derive(Debug, Clone, Deserialize)]
struct CredentialClaims {
    #[serde(default)]
    name: String,
    exp: i64,
}

/// A decoded bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    moderator: String,
    expires_at: OffsetDateTime,
}

impl Credential {
    pub fn decode(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(CredentialError::Segments(segments.len()));
        }

        let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
        let claims: CredentialClaims = serde_json::from_slice(&payload)?;
        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|_| CredentialError::Expiry(claims.exp))?;

        Ok(Self {
            moderator: claims.name,
            expires_at,
            token,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn moderator(&self) -> &str {
        &self.moderator
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
