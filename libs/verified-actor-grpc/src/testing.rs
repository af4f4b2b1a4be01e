//! Sidecar simulation for gRPC tests.
#![allow(clippy::expect_used)]

use tonic::metadata::{Ascii, MetadataValue};
use verified_actor::VERIFIED_JWT_HEADER;
use verified_actor::testing::TestToken;

use crate::request_ext::with_action;

/// Put the token into the request metadata the way the sidecar does.
///
/// # Panics
/// Panics if the encoded claims are not a valid metadata value. The header
/// value escapes non-ASCII text, so this only happens for control
/// characters the JSON encoder leaves alone.
pub fn attach_verified_jwt<T>(request: &mut tonic::Request<T>, token: &TestToken) {
    let value: MetadataValue<Ascii> = token
        .header_value()
        .parse()
        .expect("test claims must be an ASCII metadata value");
    request.metadata_mut().insert(VERIFIED_JWT_HEADER, value);
}

/// A request for `message` carrying the token in its metadata.
///
/// # Panics
/// See [`attach_verified_jwt`].
#[must_use]
pub fn verified_request<T>(message: T, token: &TestToken) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    attach_verified_jwt(&mut request, token);
    request
}

/// Attach the token's action for `method` directly, skipping the header.
///
/// # Panics
/// Panics if the token's claims do not derive a valid actor.
#[must_use]
pub fn with_test_action<T>(
    request: tonic::Request<T>,
    token: &TestToken,
    method: &str,
) -> tonic::Request<T> {
    with_action(request, token.action(method))
}
