//! Ed25519 verification of Discord interaction requests.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::{Result, ScoutError};

/// Header carrying the hex-encoded request signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";

/// Header carrying the timestamp that prefixes the signed message.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Verifies request signatures against the application's public key.
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl InteractionVerifier {
    /// Create a verifier from a hex-encoded 32-byte public key.
    pub fn from_hex(public_key: &str) -> Result<Self> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| ScoutError::Config(format!("invalid Discord public key: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            ScoutError::Config("invalid Discord public key: expected 32 bytes".to_string())
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| ScoutError::Config(format!("invalid Discord public key: {e}")))?;

        Ok(Self { key })
    }

    pub fn from_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Check `signature` (hex) over `timestamp || body`.
    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> bool {
        let Ok(bytes) = hex::decode(signature) else {
            return false;
        };
        let Ok(bytes) = <[u8; 64]>::try_from(bytes.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key.verify(&message, &signature).is_ok()
    }
}
