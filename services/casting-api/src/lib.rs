//! Casting agency HTTP service library crate.
//!
//! # Purpose
//! Exposes the movie and actor API, its permission wiring, configuration,
//! observability, and storage backends for use by the binary and tests.
//!
//! # Notes
//! Every resource route requires exactly one permission, checked by
//! [`auth::RequirePermissionLayer`] before the request body is read.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
