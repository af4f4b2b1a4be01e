#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![deny(rust_2018_idioms)]
//! gRPC ingress for sidecar-verified callers.
//!
//! [`VerifiedActorLayer`] reads the trusted header the sidecar sets on every
//! inbound call, derives the caller's [`Action`](verified_actor::Action) and
//! attaches it to the request. Handlers read it with [`RequestActionExt`].

pub mod config;
pub mod ingress;
pub mod request_ext;
pub mod status;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{ConfigError, VerifiedActorConfig};
pub use ingress::{Ingress, VerifiedActorLayer, VerifiedActorService};
pub use request_ext::{RequestActionExt, with_action};
pub use status::to_status;
pub use verified_actor::VERIFIED_JWT_HEADER;
