// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim signing on the Stark curve.
//!
//! The claim website verifies `signature` against the bot's public key and
//! the message `pedersen(user_id, wallet)`. Both parts are interpreted as
//! field elements: `0x`-prefixed values as hex, anything else as decimal
//! (Discord user ids are decimal snowflakes).
//!
//! Nonces come from RFC 6979, so the same key, user and wallet always
//! produce the same signature.

use starknet_crypto::{
    get_public_key, pedersen_hash, rfc6979_generate_k, sign, verify, FieldElement,
};

/// Error type for hashing and signing.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// A hash part is not a valid field element (bad wallet address, usually)
    #[error("invalid field element {value:?}: {reason}")]
    InvalidFieldElement { value: String, reason: String },

    /// Nothing to hash
    #[error("message has no parts")]
    EmptyMessage,

    /// The signing key is unusable
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// The curve rejected the message or nonce
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Stark ECDSA signature over a claim message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSignature {
    pub r: FieldElement,
    pub s: FieldElement,
}

impl std::fmt::Display for ClaimSignature {
    /// Decimal `r,s`, the format the claim website parses.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.r, self.s)
    }
}

/// Hashing and signing contract consumed by the claim workflow.
pub trait ClaimSigner: Send + Sync {
    /// Hash the ordered message parts. Order matters.
    fn message_hash(&self, parts: &[&str]) -> Result<FieldElement, SignerError>;

    /// Sign a message hash with the process-wide key.
    fn sign(&self, message_hash: &FieldElement) -> Result<ClaimSignature, SignerError>;
}

/// Parse a hex (`0x`-prefixed) or decimal string into a field element.
pub fn parse_field_element(value: &str) -> Result<FieldElement, SignerError> {
    let parsed = if value.starts_with("0x") || value.starts_with("0X") {
        FieldElement::from_hex_be(&value[2..])
    } else {
        FieldElement::from_dec_str(value)
    };

    parsed.map_err(|e| SignerError::InvalidFieldElement {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Pedersen hash over the parts, folded left to right.
///
/// Two parts hash as `pedersen(a, b)`; a single part is returned as is.
pub fn hash_parts(parts: &[&str]) -> Result<FieldElement, SignerError> {
    let (first, rest) = parts.split_first().ok_or(SignerError::EmptyMessage)?;
    let mut acc = parse_field_element(first)?;
    for part in rest {
        acc = pedersen_hash(&acc, &parse_field_element(part)?);
    }
    Ok(acc)
}

/// Signer holding the bot's Stark private key.
pub struct StarkSigner {
    private_key: FieldElement,
    public_key: FieldElement,
}

impl StarkSigner {
    /// Load the signer from its configured private key (hex or decimal).
    pub fn from_private_key(raw: &str) -> Result<Self, SignerError> {
        let private_key = parse_field_element(raw.trim())
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        if private_key == FieldElement::ZERO {
            return Err(SignerError::InvalidKey("key must be non-zero".to_string()));
        }

        Ok(Self {
            private_key,
            public_key: get_public_key(&private_key),
        })
    }

    pub fn public_key(&self) -> FieldElement {
        self.public_key
    }

    /// Check a signature against this signer's public key.
    pub fn verify(&self, message_hash: &FieldElement, signature: &ClaimSignature) -> bool {
        verify(&self.public_key, message_hash, &signature.r, &signature.s).unwrap_or(false)
    }
}

impl ClaimSigner for StarkSigner {
    fn message_hash(&self, parts: &[&str]) -> Result<FieldElement, SignerError> {
        hash_parts(parts)
    }

    fn sign(&self, message_hash: &FieldElement) -> Result<ClaimSignature, SignerError> {
        let k = rfc6979_generate_k(message_hash, &self.private_key, None);
        let signature = sign(&self.private_key, message_hash, &k)
            .map_err(|e| SignerError::Signing(format!("{e:?}")))?;

        Ok(ClaimSignature {
            r: signature.r,
            s: signature.s,
        })
    }
}
