// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ed25519 verification of inbound interaction requests.
//!
//! Discord signs `timestamp || body` with the application's key and sends
//! the result in `X-Signature-Ed25519` (hex) next to `X-Signature-Timestamp`.
//! Requests that fail verification must be answered with 401; Discord probes
//! the endpoint with bad signatures when it is configured. A timestamp
//! outside the allowed skew is rejected too, so a captured request cannot be
//! replayed later.

use std::time::Duration;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use ring::signature::{UnparsedPublicKey, ED25519};

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

const PUBLIC_KEY_LEN: usize = 32;

/// Maximum distance between the signed timestamp and the local clock.
pub const DEFAULT_MAX_SKEW: Duration = Duration::from_secs(300);

/// Error type for request verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("header {0} is not valid")]
    InvalidHeader(&'static str),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("signature does not match")]
    BadSignature,

    #[error("request timestamp {0} is outside the allowed window")]
    StaleTimestamp(i64),
}

/// Verifies interaction requests against the application public key.
#[derive(Debug, Clone)]
pub struct RequestVerifier {
    public_key: Vec<u8>,
    max_skew: Duration,
}

impl RequestVerifier {
    /// Build from the hex public key shown in the developer portal.
    pub fn from_hex(public_key_hex: &str) -> Result<Self, VerifyError> {
        let public_key = hex::decode(public_key_hex.trim())
            .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(public_key)
    }

    pub fn from_bytes(public_key: Vec<u8>) -> Result<Self, VerifyError> {
        if public_key.len() != PUBLIC_KEY_LEN {
            return Err(VerifyError::InvalidPublicKey(format!(
                "expected {PUBLIC_KEY_LEN} bytes, got {}",
                public_key.len()
            )));
        }
        Ok(Self {
            public_key,
            max_skew: DEFAULT_MAX_SKEW,
        })
    }

    pub fn with_max_skew(mut self, max_skew: Duration) -> Self {
        self.max_skew = max_skew;
        self
    }

    /// Verify a signature over `timestamp || body`.
    pub fn verify(&self, timestamp: &str, signature_hex: &str, body: &[u8]) -> Result<(), VerifyError> {
        let signature =
            hex::decode(signature_hex).map_err(|_| VerifyError::InvalidHeader(SIGNATURE_HEADER))?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, &signature)
            .map_err(|_| VerifyError::BadSignature)
    }

    /// Verify using the signature headers of an HTTP request.
    pub fn verify_request(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), VerifyError> {
        self.verify_request_at(headers, body, Utc::now())
    }

    /// [`verify_request`](Self::verify_request) against a given clock reading.
    pub fn verify_request_at(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), VerifyError> {
        let signature = header_str(headers, SIGNATURE_HEADER)?;
        let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
        self.check_fresh(timestamp, now)?;
        self.verify(timestamp, signature, body)
    }

    fn check_fresh(&self, timestamp: &str, now: DateTime<Utc>) -> Result<(), VerifyError> {
        let signed_at: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| VerifyError::InvalidHeader(TIMESTAMP_HEADER))?;
        let skew = now.timestamp().abs_diff(signed_at);
        if skew > self.max_skew.as_secs() {
            return Err(VerifyError::StaleTimestamp(signed_at));
        }
        Ok(())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, VerifyError> {
    headers
        .get(name)
        .ok_or(VerifyError::MissingHeader(name))?
        .to_str()
        .map_err(|_| VerifyError::InvalidHeader(name))
}

#[cfg(test)]
pub(crate) mod test_support {
    use ring::rand::SystemRandom;
    use ring::signature::{Ed25519KeyPair, KeyPair};

    /// Fresh keypair standing in for Discord's signing key.
    pub struct TestSigningKey {
        pair: Ed25519KeyPair,
    }

    impl TestSigningKey {
        pub fn generate() -> Self {
            let rng = SystemRandom::new();
            let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).expect("generate key");
            let pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).expect("parse key");
            Self { pair }
        }

        pub fn public_key_hex(&self) -> String {
            hex::encode(self.pair.public_key().as_ref())
        }

        pub fn sign_hex(&self, timestamp: &str, body: &[u8]) -> String {
            let mut message = timestamp.as_bytes().to_vec();
            message.extend_from_slice(body);
            hex::encode(self.pair.sign(&message).as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::TestSigningKey;
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn valid_signature_passes() {
        let key = TestSigningKey::generate();
        let verifier = RequestVerifier::from_hex(&key.public_key_hex()).unwrap();
        let body = br#"{"type":1}"#;
        let signature = key.sign_hex("1700000000", body);

        assert!(verifier.verify("1700000000", &signature, body).is_ok());
    }

    #[test]
    fn tampered_body_or_timestamp_fails() {
        let key = TestSigningKey::generate();
        let verifier = RequestVerifier::from_hex(&key.public_key_hex()).unwrap();
        let signature = key.sign_hex("1700000000", br#"{"type":1}"#);

        assert!(matches!(
            verifier.verify("1700000000", &signature, br#"{"type":2}"#),
            Err(VerifyError::BadSignature)
        ));
        assert!(matches!(
            verifier.verify("1700000001", &signature, br#"{"type":1}"#),
            Err(VerifyError::BadSignature)
        ));
        assert!(matches!(
            verifier.verify("1700000000", "zz", br#"{"type":1}"#),
            Err(VerifyError::InvalidHeader(_))
        ));
    }

    #[test]
    fn other_key_fails() {
        let key = TestSigningKey::generate();
        let other = TestSigningKey::generate();
        let verifier = RequestVerifier::from_hex(&other.public_key_hex()).unwrap();
        let signature = key.sign_hex("1", b"body");

        assert!(verifier.verify("1", &signature, b"body").is_err());
    }

    #[test]
    fn missing_headers_are_reported() {
        let key = TestSigningKey::generate();
        let verifier = RequestVerifier::from_hex(&key.public_key_hex()).unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(
            verifier.verify_request(&headers, b"body"),
            Err(VerifyError::MissingHeader(SIGNATURE_HEADER))
        ));

        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("00"));
        assert!(matches!(
            verifier.verify_request(&headers, b"body"),
            Err(VerifyError::MissingHeader(TIMESTAMP_HEADER))
        ));
    }

    fn signed_headers(key: &TestSigningKey, timestamp: &str, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&key.sign_hex(timestamp, body)).unwrap(),
        );
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(timestamp).unwrap());
        headers
    }

    #[test]
    fn fresh_request_passes() {
        let key = TestSigningKey::generate();
        let verifier = RequestVerifier::from_hex(&key.public_key_hex()).unwrap();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let headers = signed_headers(&key, "1699999900", b"body");

        assert!(verifier.verify_request_at(&headers, b"body", now).is_ok());
    }

    #[test]
    fn replayed_request_is_rejected() {
        let key = TestSigningKey::generate();
        let verifier = RequestVerifier::from_hex(&key.public_key_hex()).unwrap();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let old = signed_headers(&key, "1699999000", b"body");
        assert!(matches!(
            verifier.verify_request_at(&old, b"body", now),
            Err(VerifyError::StaleTimestamp(1_699_999_000))
        ));

        let future = signed_headers(&key, "1700000600", b"body");
        assert!(matches!(
            verifier.verify_request_at(&future, b"body", now),
            Err(VerifyError::StaleTimestamp(_))
        ));

        let garbled = signed_headers(&key, "yesterday", b"body");
        assert!(matches!(
            verifier.verify_request_at(&garbled, b"body", now),
            Err(VerifyError::InvalidHeader(TIMESTAMP_HEADER))
        ));
    }

    #[test]
    fn skew_is_configurable() {
        let key = TestSigningKey::generate();
        let verifier = RequestVerifier::from_hex(&key.public_key_hex())
            .unwrap()
            .with_max_skew(Duration::from_secs(10));
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let headers = signed_headers(&key, "1699999900", b"body");

        assert!(matches!(
            verifier.verify_request_at(&headers, b"body", now),
            Err(VerifyError::StaleTimestamp(_))
        ));
    }

    #[test]
    fn public_key_must_be_32_bytes() {
        assert!(RequestVerifier::from_hex("abcd").is_err());
        assert!(RequestVerifier::from_hex("not hex").is_err());
    }
}
