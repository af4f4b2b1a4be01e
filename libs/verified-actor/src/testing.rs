//! Deterministic claims and actors for tests.
//!
//! [`TestToken`] starts from a valid claim set and applies override options in
//! order. The result can be rendered as the trusted header value (what the
//! sidecar would send) or turned straight into an [`Action`] and attached to a
//! call scope.
//!
//! ```ignore
//! let token = TestToken::new()
//!     .with(with_scopes(["orders:read"]))
//!     .with(with_actor_tags([("team", "payments")]));
//! let ext = token.inject(http::Extensions::new(), "/orders.Service/Get");
//! ```
#![allow(clippy::expect_used)]

use std::fmt::Write as _;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::action::Action;
use crate::actor::{Actor, Claim, actor_from_claims};
use crate::claims::{Audience, Claims};
use crate::context::{CallScope, with_action};

/// Replace the actor tags.
pub fn with_actor_tags<I, K, V>(tags: I) -> impl FnOnce(&mut Claims)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let tags = tags
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    move |claims| claims.actor_tags = tags
}

/// Replace the scopes.
pub fn with_scopes<I, S>(scopes: I) -> impl FnOnce(&mut Claims)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let scopes = scopes.into_iter().map(Into::into).collect();
    move |claims| claims.scopes = scopes
}

/// Copy scopes, tenant and realm from an existing claim.
pub fn with_claim(claim: &Claim) -> impl FnOnce(&mut Claims) {
    let claim = claim.clone();
    move |claims| {
        claims.scopes = claim.scopes;
        claims.tenant_type = claim.tenant_type;
        claims.tenant_id = claim.tenant_id;
        claims.realm_id = claim.realm_id;
    }
}

/// Set the subject to `<subject_type>/<subject_id>`.
pub fn with_subject(subject_type: &str, subject_id: Uuid) -> impl FnOnce(&mut Claims) {
    let subject = format!("{subject_type}/{subject_id}");
    move |claims| claims.subject = subject
}

/// Builder for claims that pass the same validation as production traffic.
#[derive(Debug, Clone)]
pub struct TestToken {
    claims: Claims,
}

impl Default for TestToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TestToken {
    /// Fresh claims: random ids, a one hour validity window and no scopes.
    #[must_use]
    pub fn new() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            claims: Claims {
                id: Uuid::new_v4().to_string(),
                issuer: "test".to_owned(),
                subject: format!("test/{}", Uuid::new_v4()),
                audience: Audience::from("test"),
                issued_at: now.unix_timestamp(),
                expires: (now + Duration::hours(1)).unix_timestamp(),
                not_before: now.unix_timestamp(),
                scopes: Vec::new(),
                tenant_type: "test".to_owned(),
                tenant_id: Uuid::new_v4().to_string(),
                realm_id: Uuid::new_v4().to_string(),
                actor_tags: std::collections::BTreeMap::new(),
            },
        }
    }

    /// Start from an already built claim set.
    #[must_use]
    pub fn from_claims(claims: Claims) -> Self {
        Self { claims }
    }

    /// Apply one override. Options run in the order they are added.
    #[must_use]
    pub fn with(mut self, option: impl FnOnce(&mut Claims)) -> Self {
        option(&mut self.claims);
        self
    }

    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    #[must_use]
    pub fn into_claims(self) -> Claims {
        self.claims
    }

    /// The claims as the sidecar would put them in the trusted header.
    ///
    /// Non-ASCII characters are written as `\uXXXX` escapes, so the value is
    /// always a valid ASCII metadata value.
    ///
    /// # Panics
    /// Panics if the claims cannot be serialized, which means the test
    /// harness itself is broken.
    #[must_use]
    pub fn header_value(&self) -> String {
        let json = self
            .claims
            .to_json()
            .expect("test claims must serialize to JSON");
        escape_non_ascii(&json)
    }

    /// The actor production ingress would derive from these claims.
    ///
    /// # Panics
    /// Panics if an override produced claims that fail validation.
    #[must_use]
    pub fn actor(&self) -> Actor {
        actor_from_claims(&self.claims).expect("test claims must derive a valid actor")
    }

    /// # Panics
    /// See [`TestToken::actor`].
    #[must_use]
    pub fn action(&self, method: impl Into<String>) -> Action {
        Action::authenticated(self.actor(), method)
    }

    /// Attach the action for `method` directly, skipping header parsing.
    ///
    /// # Panics
    /// See [`TestToken::actor`].
    #[must_use]
    pub fn inject<S: CallScope>(&self, scope: S, method: impl Into<String>) -> S {
        with_action(scope, self.action(method))
    }
}

// Non-ASCII only occurs inside JSON strings, where `\u` escapes are valid.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        let mut units = [0_u16; 2];
        for unit in c.encode_utf16(&mut units) {
            write!(out, "\\u{unit:04x}").expect("writing to a String cannot fail");
        }
    }
    out
}
