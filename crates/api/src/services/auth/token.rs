//! Bearer token signing and verification.
//!
//! Tokens are compact HS256 JWTs: `header.claims.signature`, each part
//! base64url without padding. Claims carry the user ID as a string plus
//! `iat`/`exp` in Unix seconds.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use teakspice_core::UserId;

use crate::config::TokenConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors from issuing or verifying a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not three dot-separated base64url parts, or undecodable JSON.
    #[error("malformed token")]
    Malformed,

    /// Header names an algorithm other than HS256.
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    /// Signature does not match.
    #[error("invalid token signature")]
    BadSignature,

    /// `exp` is not in the future.
    #[error("token expired")]
    Expired,

    /// The signing key could not be used.
    #[error("invalid signing key")]
    InvalidKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            ttl: config.ttl,
        }
    }

    /// Issue a token for `user_id` valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the secret cannot key the MAC.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the secret cannot key the MAC.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let header = Header {
            alg: "HS256".to_owned(),
            typ: "JWT".to_owned(),
        };
        let claims = Claims {
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let header = encode_part(&header)?;
        let claims = encode_part(&claims)?;
        let signing_input = format!("{header}.{claims}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_part(header_b64)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_part(claims_b64)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        claims.user_id.parse().map_err(|_| TokenError::Malformed)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidKey)
    }
}

fn encode_part<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|_| TokenError::Malformed)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
