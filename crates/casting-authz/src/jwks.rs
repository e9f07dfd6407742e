//! Identity provider signing key cache.
//!
//! # Purpose
//! Resolve a token's key id to a verification key, fetching the provider's
//! published JWKS document only when the key id is not cached yet.
//!
//! # Key invariants
//! - A cache hit performs no I/O.
//! - A miss triggers at most one fetch for the caller; the lookup is retried
//!   once afterwards and then fails with [`AuthError::KeyNotFound`].
//! - Keys live for the lifetime of the cache; refreshes only add or replace.
//!
//! # Concurrency model
//! Keys sit in a `DashMap`, so lookups never wait on each other. Refreshes are
//! serialized by an async mutex paired with an attempt counter: a caller that
//! missed before a refresh finished reuses that refresh's outcome instead of
//! fetching again, which collapses a burst of cold misses into one request.
use crate::{AuthConfigError, AuthError, AuthResult};
use dashmap::DashMap;
use jsonwebtoken::jwk::{Jwk, JwkSet, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Public verification key published by the identity provider.
#[derive(Clone)]
pub struct SigningKey {
    pub kid: String,
    /// Algorithm declared on the JWK, when the provider publishes one.
    pub algorithm: Option<Algorithm>,
    pub decoding_key: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RefreshState {
    last_error: Option<String>,
}

/// Process-scoped cache of the provider's signing keys.
///
/// Cloning is cheap and every clone shares the same keys and refresh state.
#[derive(Clone)]
pub struct KeySetCache {
    client: reqwest::Client,
    jwks_url: Arc<str>,
    keys: Arc<DashMap<String, Arc<SigningKey>>>,
    refresh: Arc<Mutex<RefreshState>>,
    attempts: Arc<AtomicU64>,
}

impl KeySetCache {
    /// Build a cache for the JWKS document at `jwks_url`.
    ///
    /// # Errors
    /// - [`AuthConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(jwks_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self::with_client(jwks_url, client))
    }

    pub fn with_client(jwks_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            jwks_url: Arc::from(jwks_url.into()),
            keys: Arc::new(DashMap::new()),
            refresh: Arc::new(Mutex::new(RefreshState::default())),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Number of remote refreshes attempted so far, successful or not.
    pub fn refresh_count(&self) -> u64 {
        self.attempts.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Seed the cache with an already known key set. Returns how many keys
    /// were usable.
    pub fn insert_jwks(&self, jwks: &JwkSet) -> usize {
        let mut inserted = 0;
        for jwk in &jwks.keys {
            if let Some(key) = signing_key_from_jwk(jwk) {
                self.keys.insert(key.kid.clone(), Arc::new(key));
                inserted += 1;
            }
        }
        inserted
    }

    /// Resolve `kid` to a signing key, refreshing once on a miss.
    ///
    /// # Errors
    /// - [`AuthError::KeySetUnavailable`] if the refresh this call depends on failed.
    /// - [`AuthError::KeyNotFound`] if the key id is absent after a successful refresh.
    pub async fn resolve(&self, kid: &str) -> AuthResult<Arc<SigningKey>> {
        if let Some(key) = self.cached(kid) {
            return Ok(key);
        }
        let observed = self.attempts.load(Ordering::Acquire);
        let mut state = self.refresh.lock().await;
        // A refresh that finished before `observed` was read may already hold the key.
        if let Some(key) = self.cached(kid) {
            return Ok(key);
        }
        // Another caller may have refreshed while we waited for the lock; its
        // outcome already answers our miss.
        if self.attempts.load(Ordering::Acquire) == observed {
            state.last_error = self.fetch_and_store().await.err();
            self.attempts.fetch_add(1, Ordering::AcqRel);
        }
        if let Some(err) = &state.last_error {
            return Err(AuthError::KeySetUnavailable(err.clone()));
        }
        drop(state);
        self.cached(kid)
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    fn cached(&self, kid: &str) -> Option<Arc<SigningKey>> {
        self.keys.get(kid).map(|entry| entry.value().clone())
    }

    async fn fetch_and_store(&self) -> Result<(), String> {
        tracing::info!(jwks_url = %self.jwks_url, "fetching identity provider signing keys");
        let response = self
            .client
            .get(self.jwks_url.as_ref())
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "jwks fetch failed");
                format!("fetch jwks: {err}")
            })?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "jwks endpoint returned non-success status");
            return Err(format!("jwks endpoint returned {status}"));
        }
        let jwks: JwkSet = response.json().await.map_err(|err| {
            tracing::warn!(error = %err, "jwks document could not be decoded");
            format!("decode jwks: {err}")
        })?;
        let inserted = self.insert_jwks(&jwks);
        tracing::info!(
            published = jwks.keys.len(),
            usable = inserted,
            "identity provider signing keys cached"
        );
        Ok(())
    }
}

impl std::fmt::Debug for KeySetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySetCache")
            .field("jwks_url", &self.jwks_url)
            .field("keys", &self.keys.len())
            .field("refreshes", &self.refresh_count())
            .finish()
    }
}

fn signing_key_from_jwk(jwk: &Jwk) -> Option<SigningKey> {
    let Some(kid) = jwk.common.key_id.clone() else {
        tracing::warn!("skipping jwk without key id");
        return None;
    };
    if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
        tracing::debug!(%kid, "skipping encryption jwk");
        return None;
    }
    let decoding_key = match DecodingKey::from_jwk(jwk) {
        Ok(key) => key,
        Err(err) => {
            tracing::warn!(%kid, error = %err, "skipping unusable jwk");
            return None;
        }
    };
    Some(SigningKey {
        kid,
        algorithm: jwk.common.key_algorithm.and_then(signature_algorithm),
        decoding_key,
    })
}

fn signature_algorithm(key_alg: KeyAlgorithm) -> Option<Algorithm> {
    match key_alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}
