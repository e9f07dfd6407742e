mod common;

use casting_authz::{
    AuthError, AuthorizationGate, DELETE_ACTORS, DEFAULT_FETCH_TIMEOUT, KeySetCache, READ_ACTORS,
    TokenVerifier, VerifierConfig,
};
use common::{AUDIENCE, ISSUER, KID, claims, jwks_json, mint};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn gate() -> AuthorizationGate {
    let keys = KeySetCache::new("http://127.0.0.1:1/jwks", DEFAULT_FETCH_TIMEOUT).expect("cache");
    keys.insert_jwks(&serde_json::from_value(jwks_json(KID)).expect("jwks"));
    AuthorizationGate::new(TokenVerifier::new(VerifierConfig::new(ISSUER, AUDIENCE), keys))
}

#[tokio::test]
async fn granted_permission_runs_operation_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let protected = gate().protect(READ_ACTORS, {
        let calls = calls.clone();
        move |request: u32| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                request * 2
            }
        }
    });
    let header = format!("Bearer {}", mint(KID, &claims(&["read:actors"])));

    let output = protected.call(Some(&header), 21).await.expect("authorized");
    assert_eq!(output, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_permission_is_forbidden_and_skips_operation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let protected = gate().protect(DELETE_ACTORS, {
        let calls = calls.clone();
        move |_: ()| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        }
    });
    let header = format!("Bearer {}", mint(KID, &claims(&["read:actors"])));

    let err = protected.call(Some(&header), ()).await.expect_err("denied");
    assert_eq!(err, AuthError::PermissionDenied("delete:actors".to_string()));
    assert_eq!(err.status_code(), 403);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn authentication_failures_short_circuit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let protected = gate().protect(READ_ACTORS, {
        let calls = calls.clone();
        move |_: ()| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    let cases = [
        (None, AuthError::AuthHeaderMissing),
        (Some("Token abc"), AuthError::AuthSchemeInvalid),
        (Some("Bearer"), AuthError::AuthHeaderMalformed),
        (Some("Bearer "), AuthError::TokenEmpty),
    ];
    for (header, expected) in cases {
        let err = protected.call(header, ()).await.expect_err("rejected");
        assert_eq!(err, expected);
        assert_eq!(err.status_code(), 401);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn authorize_returns_verified_claims() {
    let header = format!("Bearer {}", mint(KID, &claims(&["read:actors", "delete:actors"])));
    let claims = gate()
        .authorize(Some(&header), &DELETE_ACTORS)
        .await
        .expect("authorized");
    assert!(claims.has_permission(&READ_ACTORS));
    assert!(claims.has_permission(&DELETE_ACTORS));
}
