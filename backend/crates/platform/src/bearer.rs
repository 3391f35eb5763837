//! Bearer Token Extraction
//!
//! Parsing of the `Authorization: Bearer <token>` request header.

use http::{HeaderMap, header};
use thiserror::Error;

/// Header present but not `Bearer <token>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("Authorization header is not a bearer token")]
    Malformed,
}

/// Read the raw `Authorization` header value, if any.
///
/// A header that is present but not visible ASCII is reported as malformed.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, BearerError> {
    match headers.get(header::AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value.to_str().map(Some).map_err(|_| BearerError::Malformed),
    }
}

/// Split `Bearer <token>` and return the token.
///
/// The scheme is matched case-insensitively (RFC 9110 §11.1).
pub fn bearer_token(header_value: &str) -> Result<&str, BearerError> {
    let (scheme, token) = header_value
        .trim()
        .split_once(' ')
        .ok_or(BearerError::Malformed)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::Malformed);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(BearerError::Malformed);
    }

    Ok(token)
}
