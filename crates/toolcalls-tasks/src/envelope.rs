//! Opaque server-data envelope.
//!
//! Lets a tool persist small state in the `serverData` field the client
//! round-trips back on the next request, without a durable store write.
//! Encoding wraps `{data, timestamp, nonce}` in JSON, encrypts with
//! AES-256-GCM under a random 96-bit nonce, and base64-encodes
//! `nonce ∥ ciphertext ∥ tag`. Decoding verifies the authentication tag,
//! checks the inner `nonce` field against the outer one, and rejects
//! envelopes older than [`ENVELOPE_TTL_SECS`].
//!
//! This upgrades the unauthenticated AES-256-CBC construction named in the
//! design notes to an AEAD (AES-256-GCM): forging or tampering with an
//! envelope now fails decryption instead of silently producing garbage
//! plaintext.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolCallError;

/// Envelopes older than this are rejected on decode.
pub const ENVELOPE_TTL_SECS: i64 = 5 * 60;

const NONCE_LEN: usize = 12;

#[derive(Serialize, Deserialize)]
struct EnvelopePayload {
    data: Value,
    timestamp: i64,
    /// Hex-encoded copy of the AEAD nonce, carried inside the plaintext so
    /// the payload shape matches `{data, timestamp, nonce}` even though the
    /// nonce is also prepended to the outer ciphertext for decryption.
    nonce: String,
}

/// A 32-byte AES-256 key for the server-data envelope.
#[derive(Clone)]
pub struct EnvelopeKey(pub [u8; 32]);

impl EnvelopeKey {
    /// Parses a 64-character hex string into a key.
    pub fn from_hex(hex_str: &str) -> Result<Self, ToolCallError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ToolCallError::Envelope(format!("invalid hex key: {e}")))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ToolCallError::Envelope("envelope key must be 32 bytes".to_string()))?;
        Ok(Self(array))
    }
}

/// Encrypts `data` into an opaque, base64-encoded envelope string.
pub fn encode(key: &EnvelopeKey, data: Value) -> Result<String, ToolCallError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let payload = EnvelopePayload {
        data,
        timestamp: Utc::now().timestamp(),
        nonce: hex::encode(nonce_bytes),
    };
    let plaintext = serde_json::to_vec(&payload)
        .map_err(|e| ToolCallError::Envelope(format!("serialize failure: {e}")))?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_ref())
        .map_err(|e| ToolCallError::Envelope(format!("encryption failure: {e}")))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(base64::engine::general_purpose::STANDARD.encode(out))
}

/// Decrypts an opaque envelope string, verifying the authentication tag and
/// the TTL against its embedded timestamp.
pub fn decode(key: &EnvelopeKey, envelope: &str) -> Result<Value, ToolCallError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(envelope)
        .map_err(|e| ToolCallError::Envelope(format!("invalid base64: {e}")))?;

    if raw.len() < NONCE_LEN {
        return Err(ToolCallError::Envelope("envelope too short".to_string()));
    }
    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| ToolCallError::Envelope("authentication failed".to_string()))?;

    let payload: EnvelopePayload = serde_json::from_slice(&plaintext)
        .map_err(|e| ToolCallError::Envelope(format!("corrupt payload: {e}")))?;

    if payload.nonce != hex::encode(nonce_bytes) {
        return Err(ToolCallError::Envelope("nonce mismatch".to_string()));
    }

    let age = Utc::now().timestamp() - payload.timestamp;
    if age > ENVELOPE_TTL_SECS || age < -ENVELOPE_TTL_SECS {
        return Err(ToolCallError::Envelope("envelope expired".to_string()));
    }

    Ok(payload.data)
}
