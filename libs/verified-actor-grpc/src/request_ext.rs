use tonic::Status;
use verified_actor::{Action, Actor};

use crate::status::to_status;

/// Read access to the verified caller from a tonic handler.
///
/// ```ignore
/// async fn get(&self, request: Request<GetOrder>) -> Result<Response<Order>, Status> {
///     let actor = request.authenticated_actor()?;
///     ...
/// }
/// ```
pub trait RequestActionExt {
    /// The action attached by the ingress layer, if any.
    fn action(&self) -> Option<&Action>;

    /// The action of an authenticated call.
    ///
    /// # Errors
    /// `INTERNAL` when no action was attached (no verified claims arrived, or
    /// the ingress layer never ran), `UNAUTHENTICATED` when the action has no
    /// actor.
    fn authenticated_action(&self) -> Result<&Action, Status>;

    /// # Errors
    /// Same as [`RequestActionExt::authenticated_action`].
    fn authenticated_actor(&self) -> Result<&Actor, Status>;
}

impl<T> RequestActionExt for tonic::Request<T> {
    fn action(&self) -> Option<&Action> {
        verified_actor::get_action(self.extensions())
    }

    fn authenticated_action(&self) -> Result<&Action, Status> {
        verified_actor::get_authenticated_action(self.extensions()).map_err(|e| to_status(&e))
    }

    fn authenticated_actor(&self) -> Result<&Actor, Status> {
        verified_actor::get_authenticated_actor(self.extensions()).map_err(|e| to_status(&e))
    }
}

/// Attach `action` to a tonic request directly.
///
/// Meant for handler tests; served requests get their action from
/// [`crate::VerifiedActorLayer`].
#[must_use]
pub fn with_action<T>(request: tonic::Request<T>, action: Action) -> tonic::Request<T> {
    let (metadata, extensions, message) = request.into_parts();
    tonic::Request::from_parts(
        metadata,
        verified_actor::with_action(extensions, action),
        message,
    )
}
