//! Per-route permission enforcement as a tower layer.
//!
//! # Key invariants
//! - The inner service is only called after the gate accepts the token.
//! - Rejections are rendered as the API error envelope without touching the
//!   request body, so authentication is checked before any payload parsing.
//! - Accepted requests carry their `DecodedClaims` in the extensions.
use crate::api::error::ApiError;
use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Response};
use casting_authz::{AuthError, AuthorizationGate, Permission};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::{Layer, Service};

#[derive(Clone)]
pub struct RequirePermissionLayer {
    gate: AuthorizationGate,
    permission: Permission,
}

impl RequirePermissionLayer {
    pub fn new(gate: AuthorizationGate, permission: Permission) -> Self {
        Self { gate, permission }
    }
}

impl<S> Layer<S> for RequirePermissionLayer {
    type Service = RequirePermissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePermissionService {
            inner,
            gate: self.gate.clone(),
            permission: self.permission.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequirePermissionService<S> {
    inner: S,
    gate: AuthorizationGate,
    permission: Permission,
}

impl<S> Service<Request> for RequirePermissionService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        // Call the service that was polled ready; leave the clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let gate = self.gate.clone();
        let permission = self.permission.clone();

        Box::pin(async move {
            let header = bearer_header(&request);
            let decision = match header {
                Ok(header) => gate.authorize(header.as_deref(), &permission).await,
                Err(err) => Err(err),
            };
            match decision {
                Ok(claims) => {
                    metrics::counter!("casting_auth_decisions_total", "outcome" => "allowed")
                        .increment(1);
                    request.extensions_mut().insert(claims);
                    inner.call(request).await
                }
                Err(err) => {
                    let outcome = if err.status_code() == 403 {
                        "forbidden"
                    } else {
                        "unauthorized"
                    };
                    metrics::counter!("casting_auth_decisions_total", "outcome" => outcome)
                        .increment(1);
                    tracing::info!(
                        code = err.code(),
                        detail = %err,
                        permission = %permission,
                        method = %request.method(),
                        path = %request.uri().path(),
                        "request rejected by authorization gate"
                    );
                    Ok(ApiError::from(err).into_response())
                }
            }
        })
    }
}

// Owned so the request is not borrowed across the verification await.
fn bearer_header(request: &Request) -> Result<Option<String>, AuthError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| AuthError::AuthHeaderMalformed)
        })
        .transpose()
}
