//! Security Module
//!
//! Provides security features for the Tabquery API:
//! - Authentication (HTTP Basic + injectable credential verification)
//! - Security Middleware

pub mod auth;
pub mod middleware;


pub use auth::{BasicCredentials, CredentialVerifier, StaticCredentialVerifier, hash_password};
pub use middleware::AuthenticatedUser;
