//! Security Middleware Module
//!
//! Provides Axum middleware for Basic authentication and security headers.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::result::Result as StdResult;
use tracing::debug;

use crate::api::app_state::AppState;
use crate::error::AppError;
use crate::security::auth::BasicCredentials;

/// Authenticated username, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Basic authentication middleware
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> StdResult<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let credentials = BasicCredentials::from_authorization_header(auth_header)
        .ok_or_else(|| AppError::Authentication("Missing Basic credentials".to_string()))?;

    if !state
        .credential_verifier
        .verify(&credentials.username, &credentials.password)
    {
        debug!("Rejected credentials for user {}", credentials.username);
        return Err(AppError::Authentication(
            "Incorrect username or password".to_string(),
        ));
    }

    req.extensions_mut()
        .insert(AuthenticatedUser(credentials.username));

    Ok(next.run(req).await)
}

/// Security headers middleware
pub async fn security_headers_middleware(
    req: Request<Body>,
    next: Next,
) -> StdResult<Response, StatusCode> {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", header::HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        header::HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Content-Security-Policy",
        header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    Ok(response)
}
