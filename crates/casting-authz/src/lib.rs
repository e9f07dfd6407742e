//! Bearer token authorization for the casting API.
//!
//! # Purpose
//! Decide whether a request may run a protected operation: pull the bearer
//! token from the `Authorization` header, verify it against the identity
//! provider's published signing keys, and check that it grants the one
//! permission the operation requires.
//!
//! # Key invariants
//! - Verification fails closed; any doubt about a token is an [`AuthError`].
//! - Only [`AuthError::PermissionDenied`] maps to 403, everything else to 401.
//! - Unknown key ids trigger at most one key set refresh per lookup.
//!
//! # Example
//! ```no_run
//! use casting_authz::{
//!     AuthorizationGate, KeySetCache, TokenVerifier, VerifierConfig, DEFAULT_FETCH_TIMEOUT,
//!     READ_ACTORS,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = KeySetCache::new("https://idp.example/.well-known/jwks.json", DEFAULT_FETCH_TIMEOUT)?;
//! let config = VerifierConfig::new("https://idp.example/", "casting");
//! let gate = AuthorizationGate::new(TokenVerifier::new(config, keys));
//! let claims = gate.authorize(Some("Bearer <token>"), &READ_ACTORS).await?;
//! println!("{:?}", claims.subject);
//! # Ok(())
//! # }
//! ```
pub mod bearer;
pub mod errors;
pub mod gate;
pub mod jwks;
pub mod permission;
pub mod token;

pub use bearer::{BEARER_SCHEME, extract_bearer};
pub use errors::{AuthConfigError, AuthError, AuthResult};
pub use gate::{AuthorizationGate, Protected};
pub use jwks::{DEFAULT_FETCH_TIMEOUT, KeySetCache, SigningKey};
pub use permission::{
    DELETE_ACTORS, DELETE_MOVIES, PATCH_ACTORS, PATCH_MOVIES, POST_ACTORS, POST_MOVIES,
    Permission, READ_ACTORS, READ_MOVIES,
};
pub use token::{DEFAULT_ALGORITHM, DecodedClaims, TokenVerifier, VerifierConfig};
