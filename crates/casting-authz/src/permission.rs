//! Permission requirements declared by protected operations.
//!
//! # Key invariants
//! - Permission strings are `action:resource`, both parts non-empty.
//! - A requirement is fixed when a route is registered and never mutated.
//! - Matching is exact membership; there are no wildcards.
use crate::AuthConfigError;
use std::borrow::Cow;
use std::fmt;

/// A single permission string such as `read:actors`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Build a permission from a string literal known to be well formed.
    pub const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Parse and validate a permission string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AuthConfigError> {
        let raw = raw.into();
        match raw.split_once(':') {
            Some((action, resource))
                if !action.is_empty()
                    && !resource.is_empty()
                    && !raw.chars().any(char::is_whitespace) =>
            {
                Ok(Self(Cow::Owned(raw)))
            }
            _ => Err(AuthConfigError::InvalidPermission(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const READ_ACTORS: Permission = Permission::from_static("read:actors");
pub const READ_MOVIES: Permission = Permission::from_static("read:movies");
pub const POST_ACTORS: Permission = Permission::from_static("post:actors");
pub const POST_MOVIES: Permission = Permission::from_static("post:movies");
pub const PATCH_ACTORS: Permission = Permission::from_static("patch:actors");
pub const PATCH_MOVIES: Permission = Permission::from_static("patch:movies");
pub const DELETE_ACTORS: Permission = Permission::from_static("delete:actors");
pub const DELETE_MOVIES: Permission = Permission::from_static("delete:movies");
