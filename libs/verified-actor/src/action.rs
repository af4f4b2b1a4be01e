use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// The caller paired with the method it invoked, for a single call.
///
/// An action without an actor is an unauthenticated call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub actor: Option<Actor>,
    /// Fully-qualified RPC method, e.g. `/orders.Service/Get`.
    pub method: String,
}

impl Action {
    #[must_use]
    pub fn authenticated(actor: Actor, method: impl Into<String>) -> Self {
        Self {
            actor: Some(actor),
            method: method.into(),
        }
    }

    #[must_use]
    pub fn unauthenticated(method: impl Into<String>) -> Self {
        Self {
            actor: None,
            method: method.into(),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }
}
