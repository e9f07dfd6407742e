//! Permission gate in front of protected operations.
//!
//! The gate owns no state besides the verifier. Each protected operation is
//! bound to exactly one [`Permission`] when it is wrapped, and the wrapped
//! operation only runs after the caller's token proves that permission.
use crate::bearer::extract_bearer;
use crate::permission::Permission;
use crate::token::{DecodedClaims, TokenVerifier};
use crate::{AuthError, AuthResult};
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    verifier: Arc<TokenVerifier>,
}

impl AuthorizationGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authenticate the header value and check it grants `required`.
    pub async fn authorize(
        &self,
        header: Option<&str>,
        required: &Permission,
    ) -> AuthResult<DecodedClaims> {
        let token = extract_bearer(header)?;
        let claims = self.verifier.verify(token).await?;
        if !claims.has_permission(required) {
            return Err(AuthError::PermissionDenied(required.to_string()));
        }
        Ok(claims)
    }

    /// Bind `operation` to `permission`.
    pub fn protect<Op>(&self, permission: Permission, operation: Op) -> Protected<Op> {
        Protected {
            gate: self.clone(),
            permission,
            operation,
        }
    }
}

/// An operation that only runs for callers holding its permission.
#[derive(Debug, Clone)]
pub struct Protected<Op> {
    gate: AuthorizationGate,
    permission: Permission,
    operation: Op,
}

impl<Op> Protected<Op> {
    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    /// Authorize the caller, then run the operation once with `request`.
    pub async fn call<Req, Fut>(&self, header: Option<&str>, request: Req) -> AuthResult<Fut::Output>
    where
        Op: Fn(Req) -> Fut,
        Fut: Future,
    {
        self.gate.authorize(header, &self.permission).await?;
        Ok((self.operation)(request).await)
    }
}
