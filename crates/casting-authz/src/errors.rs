use thiserror::Error;

/// Failure kinds produced while authorizing a single request.
///
/// Every variant maps to a stable HTTP status and a stable short code so the
/// HTTP layer can render it without inspecting messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header is expected")]
    AuthHeaderMissing,
    #[error("authorization header must be of the form 'Bearer <token>'")]
    AuthHeaderMalformed,
    #[error("authorization header must start with 'Bearer'")]
    AuthSchemeInvalid,
    #[error("bearer token is empty")]
    TokenEmpty,
    #[error("malformed token: {0}")]
    TokenMalformed(String),
    #[error("unsupported token algorithm: {0}")]
    AlgorithmUnsupported(String),
    #[error("signing key set unavailable: {0}")]
    KeySetUnavailable(String),
    #[error("no signing key for key id {0}")]
    KeyNotFound(String),
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("malformed claims: {0}")]
    ClaimsMalformed(String),
    #[error("token expired")]
    TokenExpired,
    #[error("incorrect issuer")]
    IssuerMismatch,
    #[error("incorrect audience")]
    AudienceMismatch,
    #[error("permissions not included in token")]
    PermissionsClaimMissing,
    #[error("permission {0} not granted")]
    PermissionDenied(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// HTTP status for this failure. Only `PermissionDenied` is a 403; every
    /// other kind means the credential could not be trusted.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::PermissionDenied(_) => 403,
            _ => 401,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthHeaderMissing => "authorization_header_missing",
            AuthError::AuthHeaderMalformed => "authorization_header_malformed",
            AuthError::AuthSchemeInvalid => "authorization_scheme_invalid",
            AuthError::TokenEmpty => "token_empty",
            AuthError::TokenMalformed(_) => "token_malformed",
            AuthError::AlgorithmUnsupported(_) => "algorithm_unsupported",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::SignatureInvalid => "signature_invalid",
            AuthError::ClaimsMalformed(_) => "claims_malformed",
            AuthError::TokenExpired => "token_expired",
            AuthError::IssuerMismatch => "issuer_mismatch",
            AuthError::AudienceMismatch => "audience_mismatch",
            AuthError::PermissionsClaimMissing => "permissions_claim_missing",
            AuthError::PermissionDenied(_) => "permission_denied",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Key infrastructure failures are reported as an unverifiable credential
    /// so callers cannot tell an IdP outage apart from a bad token.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::KeySetUnavailable(_) | AuthError::KeyNotFound(_) => {
                "unable to verify credentials".to_string()
            }
            AuthError::TokenMalformed(_) => "unable to parse authentication token".to_string(),
            AuthError::ClaimsMalformed(_) => "unable to parse token claims".to_string(),
            other => other.to_string(),
        }
    }
}

/// Errors raised while building verifier configuration at startup.
#[derive(Debug, Error)]
pub enum AuthConfigError {
    #[error("unknown signing algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("symmetric algorithm {0} cannot be trusted for identity provider tokens")]
    SymmetricAlgorithm(String),
    #[error("invalid permission: {0}")]
    InvalidPermission(String),
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
