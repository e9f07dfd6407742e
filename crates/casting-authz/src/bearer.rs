//! Bearer credential extraction from an `Authorization` header value.
use crate::{AuthError, AuthResult};

pub const BEARER_SCHEME: &str = "Bearer";

/// Pull the raw token out of an `Authorization` header value.
///
/// The value must be exactly two parts separated by a single whitespace
/// character, the first being the case-sensitive scheme `Bearer`.
pub fn extract_bearer(header: Option<&str>) -> AuthResult<&str> {
    let header = header.ok_or(AuthError::AuthHeaderMissing)?;
    let parts: Vec<&str> = header.split(char::is_whitespace).collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::AuthHeaderMalformed);
    };
    if *scheme != BEARER_SCHEME {
        return Err(AuthError::AuthSchemeInvalid);
    }
    if token.is_empty() {
        return Err(AuthError::TokenEmpty);
    }
    Ok(*token)
}
