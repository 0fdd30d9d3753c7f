//! JSON envelope used on the frame topics.
//!
//! Outgoing frames travel as `{"timestamp": <ISO-8601>, "payload":
//! "0xNN 0xNN ..."}` with one lowercase hex token per frame byte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeafError {
    #[error("invalid JSON envelope: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid payload byte {0:?}")]
    BadByte(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafEnvelope {
    pub timestamp: DateTime<Utc>,
    pub payload: String,
}

impl LeafEnvelope {
    pub fn wrap(data: &[u8]) -> Self {
        Self::wrap_at(data, Utc::now())
    }

    pub fn wrap_at(data: &[u8], timestamp: DateTime<Utc>) -> Self {
        let payload = data
            .iter()
            .map(|b| format!("0x{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ");
        Self { timestamp, payload }
    }

    pub fn to_json(&self) -> Result<String, LeafError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, LeafError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse the hex token list back into raw bytes.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, LeafError> {
        self.payload
            .split_whitespace()
            .map(|token| {
                token
                    .strip_prefix("0x")
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    .ok_or_else(|| LeafError::BadByte(token.to_string()))
            })
            .collect()
    }
}
