//! Authentication Module
//!
//! Provides HTTP Basic authentication:
//! - Credential extraction from the Authorization header
//! - An injectable credential verification capability

use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::config::config::SecurityConfig;

/// Username/password pair taken from a request
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl BasicCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Parse `Basic <base64(username:password)>`
    pub fn from_authorization_header(auth_header: Option<&str>) -> Option<Self> {
        let header = auth_header?.trim();
        let (scheme, encoded) = header.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self::new(username, password))
    }

    /// Encode as an Authorization header value
    pub fn to_header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

/// Credential verification capability injected into the HTTP layer
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    /// Check a username/password pair
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Hash a password with SHA-256, hex encoded
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Verifier for a single configured account
#[derive(Clone)]
pub struct StaticCredentialVerifier {
    username: String,
    password_sha256: String,
}

impl fmt::Debug for StaticCredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialVerifier")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl StaticCredentialVerifier {
    /// Create from a plain-text password
    pub fn new(username: &str, password: &str) -> Self {
        Self::from_hash(username, &hash_password(password))
    }

    /// Create from a precomputed SHA-256 hex digest
    pub fn from_hash(username: &str, password_sha256: &str) -> Self {
        Self {
            username: username.to_string(),
            password_sha256: password_sha256.trim().to_ascii_lowercase(),
        }
    }

    /// Create from security settings
    pub fn from_settings(settings: &SecurityConfig) -> Self {
        Self::from_hash(&settings.username, &settings.password_sha256)
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        if self.username.is_empty() {
            return false;
        }

        let candidate = hash_password(password);
        let username_matches: bool = username.as_bytes().ct_eq(self.username.as_bytes()).into();
        let hash_matches: bool = candidate
            .as_bytes()
            .ct_eq(self.password_sha256.as_bytes())
            .into();

        username_matches & hash_matches
    }
}
