//! Wiring between service configuration and the authorization core.
pub mod layer;

use crate::config::AuthSettings;
use anyhow::{Context, Result};
use casting_authz::{AuthorizationGate, KeySetCache, TokenVerifier, VerifierConfig};
use std::time::Duration;

pub use layer::{RequirePermissionLayer, RequirePermissionService};

/// Build the process-wide gate from configuration. The key set starts empty
/// and is filled on the first token that names an unknown key id.
pub fn build_gate(settings: &AuthSettings) -> Result<AuthorizationGate> {
    let jwks_url = settings.jwks_url();
    let keys = KeySetCache::new(
        jwks_url.clone(),
        Duration::from_millis(settings.jwks_timeout_ms),
    )
    .with_context(|| "build jwks http client")?;
    let config = VerifierConfig::new(&settings.issuer, &settings.audience)
        .with_algorithm(&settings.algorithm)
        .with_context(|| format!("CASTING_AUTH_ALGORITHM={}", settings.algorithm))?
        .with_leeway(settings.leeway_seconds);
    tracing::info!(
        issuer = %settings.issuer,
        audience = %settings.audience,
        %jwks_url,
        algorithm = %settings.algorithm,
        "bearer token verification configured"
    );
    Ok(AuthorizationGate::new(TokenVerifier::new(config, keys)))
}
