#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Trusted caller identity for RPC handlers.
//!
//! An upstream sidecar verifies the caller's token and forwards its claims as
//! JSON in a trusted header. This crate decodes those [`Claims`], derives an
//! [`Actor`] from them and keeps the resulting [`Action`] in the call scope so
//! handlers can read it back.
//!
//! Nothing here checks signatures or expiry; deploying without the sidecar in
//! front is unsafe.

pub mod action;
pub mod actor;
pub mod claims;
pub mod context;
pub mod errors;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use action::Action;
pub use actor::{Actor, AuthenticationMethod, Claim, actor_from_claims};
pub use claims::{Audience, Claims};
pub use context::{
    CallScope, get_action, get_authenticated_action, get_authenticated_actor, with_action,
};
pub use errors::{AuthError, ErrorClass};

/// Canonical metadata key of the trusted header set by the sidecar.
pub const VERIFIED_JWT_HEADER: &str = "x-verified-jwt";
