//! Call-scoped storage for the [`Action`] of an inbound call.
//!
//! The action lives in the request's [`http::Extensions`] under a key only this
//! module can name, so it is dropped together with the request.

use std::sync::Arc;

use http::Extensions;

use crate::action::Action;
use crate::actor::Actor;
use crate::errors::AuthError;

/// Anything that owns the extensions of a single call.
pub trait CallScope {
    fn extensions(&self) -> &Extensions;
    fn extensions_mut(&mut self) -> &mut Extensions;
}

impl CallScope for Extensions {
    fn extensions(&self) -> &Extensions {
        self
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        self
    }
}

impl<B> CallScope for http::Request<B> {
    fn extensions(&self) -> &Extensions {
        http::Request::extensions(self)
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        http::Request::extensions_mut(self)
    }
}

impl CallScope for http::request::Parts {
    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

#[derive(Clone)]
struct ActionSlot(Arc<Action>);

/// Attach `action` to the scope and hand the scope back.
///
/// Production calls get their action from the ingress layer; use this
/// directly only in tests or when bypassing header parsing on purpose.
#[must_use]
pub fn with_action<S: CallScope>(mut scope: S, action: Action) -> S {
    scope
        .extensions_mut()
        .insert(ActionSlot(Arc::new(action)));
    scope
}

/// The action attached to this call, if any.
#[must_use]
pub fn get_action<S: CallScope + ?Sized>(scope: &S) -> Option<&Action> {
    scope
        .extensions()
        .get::<ActionSlot>()
        .map(|slot| slot.0.as_ref())
}

/// The action attached to this call, provided it carries an actor.
///
/// # Errors
/// Returns [`AuthError::NoAction`] when nothing was attached (the call
/// carried no verified claims, or the ingress layer is not installed) and
/// [`AuthError::NoActor`] when the attached action has no actor.
pub fn get_authenticated_action<S: CallScope + ?Sized>(scope: &S) -> Result<&Action, AuthError> {
    let action = get_action(scope).ok_or(AuthError::NoAction)?;
    if action.actor.is_none() {
        return Err(AuthError::NoActor);
    }
    Ok(action)
}

/// Shortcut for the actor of an authenticated call.
///
/// # Errors
/// Same as [`get_authenticated_action`].
pub fn get_authenticated_actor<S: CallScope + ?Sized>(scope: &S) -> Result<&Actor, AuthError> {
    get_authenticated_action(scope)?
        .actor
        .as_ref()
        .ok_or(AuthError::NoActor)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::actor::{AuthenticationMethod, Claim};
    use std::collections::BTreeMap;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn actor() -> Actor {
        Actor {
            subject_id: Uuid::from_u128(0x3fa8_5f64_5717_4562_b3fc_2c96_3f66_afa6),
            subject_type: "user".to_owned(),
            actor_tags: BTreeMap::new(),
            claim: Claim::default(),
            authentication_method: AuthenticationMethod::Jwt {
                token_id: "token-1".to_owned(),
                issuer: "issuer".to_owned(),
                issued_at: OffsetDateTime::UNIX_EPOCH,
            },
        }
    }

    #[test]
    fn empty_scope_has_no_action() {
        let ext = Extensions::new();
        assert!(get_action(&ext).is_none());
        assert!(matches!(
            get_authenticated_action(&ext),
            Err(AuthError::NoAction)
        ));
    }

    #[test]
    fn attached_action_is_returned() {
        let action = Action::authenticated(actor(), "/orders.Service/Get");
        let ext = with_action(Extensions::new(), action.clone());

        assert_eq!(get_action(&ext), Some(&action));
        assert_eq!(get_authenticated_action(&ext).unwrap(), &action);
        assert_eq!(get_authenticated_actor(&ext).unwrap(), &actor());
    }

    #[test]
    fn actorless_action_is_distinguishable_from_missing_action() {
        let ext = with_action(
            Extensions::new(),
            Action::unauthenticated("/orders.Service/Get"),
        );

        assert!(get_action(&ext).is_some());
        assert!(matches!(
            get_authenticated_action(&ext),
            Err(AuthError::NoActor)
        ));
        assert!(matches!(
            get_authenticated_actor(&ext),
            Err(AuthError::NoActor)
        ));
    }

    #[test]
    fn plain_extension_values_do_not_collide_with_the_action() {
        let mut ext = Extensions::new();
        ext.insert(Action::unauthenticated("/spoofed/Method"));
        ext.insert(Arc::new(Action::unauthenticated("/spoofed/Method")));

        assert!(get_action(&ext).is_none());
    }

    #[test]
    fn works_on_requests_and_parts() {
        let req = http::Request::builder()
            .uri("/orders.Service/Get")
            .body(())
            .unwrap();
        let req = with_action(req, Action::authenticated(actor(), "/orders.Service/Get"));
        assert_eq!(
            get_action(&req).map(|a| a.method.as_str()),
            Some("/orders.Service/Get")
        );

        let (parts, ()) = req.into_parts();
        assert!(get_authenticated_action(&parts).is_ok());
    }

    #[test]
    fn scopes_are_independent() {
        let first = with_action(Extensions::new(), Action::unauthenticated("/a.S/One"));
        let second = with_action(first.clone(), Action::authenticated(actor(), "/a.S/Two"));

        assert_eq!(get_action(&first).map(|a| a.method.as_str()), Some("/a.S/One"));
        assert_eq!(get_action(&second).map(|a| a.method.as_str()), Some("/a.S/Two"));
    }
}
