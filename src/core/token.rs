//! 短效簽章權杖 (HS256 JWS)，供不接受靜態金鑰的供應商使用。
//!
//! 金鑰格式為 `id.secret`：`id` 放入 claims，`secret` 作為 HMAC 金鑰。
//! `exp` 與 `timestamp` 皆以秒為單位。

use crate::utils::error::{RelayError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenHeader {
    pub alg: String,
    pub sign_type: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            sign_type: "SIGN".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub api_key: String,
    pub exp: i64,
    pub timestamp: i64,
}

#[derive(Clone)]
pub struct SigningKey {
    id: String,
    secret: String,
}

impl SigningKey {
    pub fn parse(api_key: &str) -> Result<Self> {
        let invalid = || RelayError::InvalidConfigValueError {
            field: "api_key".to_string(),
            value: "<redacted>".to_string(),
            reason: "Signed-token API key must have the form <id>.<secret>".to_string(),
        };

        let (id, secret) = api_key.trim().split_once('.').ok_or_else(invalid)?;
        if id.is_empty() || secret.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            id: id.to_string(),
            secret: secret.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mint(&self, ttl_seconds: u64, now: DateTime<Utc>) -> Result<String> {
        let issued_at = now.timestamp();
        let ttl = i64::try_from(ttl_seconds).map_err(|_| RelayError::TokenError {
            message: format!("TTL out of range: {}", ttl_seconds),
        })?;

        let claims = TokenClaims {
            api_key: self.id.clone(),
            exp: issued_at + ttl,
            timestamp: issued_at,
        };

        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&TokenHeader::default())?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{}.{}", header, payload);

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|e| {
            RelayError::TokenError {
                message: e.to_string(),
            }
        })?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    pub fn mint_now(&self, ttl_seconds: u64) -> Result<String> {
        self.mint(ttl_seconds, Utc::now())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
