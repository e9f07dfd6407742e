//! Bearer token verification against the identity provider's key set.
//!
//! # Purpose
//! Turn a raw compact JWS into [`DecodedClaims`] once its signature, expiry,
//! issuer and audience check out.
//!
//! # Key invariants
//! - Exactly one asymmetric algorithm is accepted; `none` and `HS*` never are.
//! - Nothing from the payload is trusted before the signature verifies.
//! - Checks run in a fixed order so every bad token maps to one error kind.
use crate::jwks::KeySetCache;
use crate::permission::Permission;
use crate::{AuthConfigError, AuthError, AuthResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::str::FromStr;

pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::RS256;
pub const PERMISSIONS_CLAIM: &str = "permissions";

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub issuer: String,
    pub audience: String,
    pub algorithm: Algorithm,
    /// Seconds of clock skew tolerated on `exp`.
    pub leeway_seconds: u64,
}

impl VerifierConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm: DEFAULT_ALGORITHM,
            leeway_seconds: 0,
        }
    }

    /// Set the accepted algorithm by name, e.g. `RS256`.
    ///
    /// # Errors
    /// - [`AuthConfigError::UnknownAlgorithm`] for names jsonwebtoken does not know, `none` included.
    /// - [`AuthConfigError::SymmetricAlgorithm`] for any `HS*` algorithm.
    pub fn with_algorithm(mut self, name: &str) -> Result<Self, AuthConfigError> {
        let algorithm = Algorithm::from_str(name)
            .map_err(|_| AuthConfigError::UnknownAlgorithm(name.to_string()))?;
        if is_symmetric(algorithm) {
            return Err(AuthConfigError::SymmetricAlgorithm(name.to_string()));
        }
        self.algorithm = algorithm;
        Ok(self)
    }

    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }
}

fn is_symmetric(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// Claims of a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClaims {
    pub issuer: String,
    pub audience: Vec<String>,
    pub subject: Option<String>,
    pub expires_at: i64,
    pub permissions: BTreeSet<String>,
}

impl DecodedClaims {
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission.as_str())
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
    kid: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TokenVerifier {
    config: VerifierConfig,
    keys: KeySetCache,
}

impl TokenVerifier {
    pub fn new(config: VerifierConfig, keys: KeySetCache) -> Self {
        Self { config, keys }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeySetCache {
        &self.keys
    }

    /// Verify `token` and return its claims.
    pub async fn verify(&self, token: &str) -> AuthResult<DecodedClaims> {
        self.verify_at(token, chrono::Utc::now().timestamp()).await
    }

    /// Verify `token` as of unix time `now`.
    pub async fn verify_at(&self, token: &str, now: i64) -> AuthResult<DecodedClaims> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
            return Err(AuthError::TokenMalformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };
        if header_b64.is_empty() || payload_b64.is_empty() {
            return Err(AuthError::TokenMalformed("empty segment".to_string()));
        }

        let header_bytes = decode_segment(header_b64, "header")?;
        let header: RawHeader = serde_json::from_slice(&header_bytes)
            .map_err(|err| AuthError::TokenMalformed(format!("header: {err}")))?;
        let payload_bytes = decode_segment(payload_b64, "payload")?;
        decode_segment(signature_b64, "signature")?;

        let algorithm = Algorithm::from_str(&header.alg)
            .map_err(|_| AuthError::AlgorithmUnsupported(header.alg.clone()))?;
        if algorithm != self.config.algorithm {
            return Err(AuthError::AlgorithmUnsupported(header.alg));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::TokenMalformed("header has no kid".to_string()))?;

        let key = self.keys.resolve(&kid).await?;
        if let Some(declared) = key.algorithm
            && declared != algorithm
        {
            return Err(AuthError::AlgorithmUnsupported(format!(
                "{} does not match key {kid}",
                header.alg
            )));
        }

        let message_len = header_b64.len() + 1 + payload_b64.len();
        let message = &token[..message_len];
        let verified = jsonwebtoken::crypto::verify(
            signature_b64,
            message.as_bytes(),
            &key.decoding_key,
            algorithm,
        )
        .unwrap_or(false);
        if !verified {
            return Err(AuthError::SignatureInvalid);
        }

        self.check_claims(&payload_bytes, now)
    }

    fn check_claims(&self, payload: &[u8], now: i64) -> AuthResult<DecodedClaims> {
        let claims: Map<String, Value> = match serde_json::from_slice(payload) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(AuthError::ClaimsMalformed(
                    "payload is not an object".to_string(),
                ));
            }
            Err(err) => return Err(AuthError::ClaimsMalformed(err.to_string())),
        };

        let expires_at = claims
            .get("exp")
            .and_then(Value::as_f64)
            .ok_or_else(|| AuthError::ClaimsMalformed("exp missing or not numeric".to_string()))?
            .floor() as i64;
        let permissions = match claims.get(PERMISSIONS_CLAIM) {
            None => None,
            Some(value) => Some(string_set(value).ok_or_else(|| {
                AuthError::ClaimsMalformed("permissions is not an array of strings".to_string())
            })?),
        };

        let leeway = i64::try_from(self.config.leeway_seconds).unwrap_or(i64::MAX);
        if expires_at.saturating_add(leeway) <= now {
            return Err(AuthError::TokenExpired);
        }

        let issuer = match claims.get("iss").and_then(Value::as_str) {
            Some(iss) if iss == self.config.issuer => iss.to_string(),
            _ => return Err(AuthError::IssuerMismatch),
        };
        let audience = match claims.get("aud") {
            Some(Value::String(aud)) => vec![aud.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        if !audience.iter().any(|aud| *aud == self.config.audience) {
            return Err(AuthError::AudienceMismatch);
        }

        let permissions = permissions.ok_or(AuthError::PermissionsClaimMissing)?;
        Ok(DecodedClaims {
            issuer,
            audience,
            subject: claims
                .get("sub")
                .and_then(Value::as_str)
                .map(str::to_string),
            expires_at,
            permissions,
        })
    }
}

fn decode_segment(segment: &str, name: &str) -> AuthResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| AuthError::TokenMalformed(format!("{name} is not base64url: {err}")))
}

fn string_set(value: &Value) -> Option<BTreeSet<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
