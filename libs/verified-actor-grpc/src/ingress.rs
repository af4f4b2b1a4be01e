//! Server-side layer that turns the sidecar's verified claims into an
//! [`Action`] attached to the call.
//!
//! ```ignore
//! let layer = VerifiedActorLayer::from_config(&cfg)?;
//! Server::builder()
//!     .layer(layer)
//!     .add_service(OrdersServer::new(orders))
//!     .serve(addr)
//!     .await?;
//! ```
//!
//! Handlers read the caller through [`crate::RequestActionExt`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{HeaderMap, HeaderName, Request, Response};
use tower::{Layer, Service};

use verified_actor::{Action, AuthError, Claims, VERIFIED_JWT_HEADER, actor_from_claims};

use crate::config::{ConfigError, VerifiedActorConfig};
use crate::status::to_status;

/// Reads the trusted header and derives the call's [`Action`].
#[derive(Debug, Clone)]
pub struct Ingress {
    header_name: HeaderName,
    require_actor: bool,
}

impl Default for Ingress {
    fn default() -> Self {
        Self {
            header_name: HeaderName::from_static(VERIFIED_JWT_HEADER),
            require_actor: false,
        }
    }
}

impl Ingress {
    /// # Errors
    /// Returns [`ConfigError`] when the configured header name is unusable.
    pub fn from_config(cfg: &VerifiedActorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            header_name: cfg.validate()?,
            require_actor: cfg.require_actor,
        })
    }

    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    /// Derive the action for a call to `method` carrying `headers`.
    ///
    /// Without the header (or with an empty value) there is nothing to
    /// attach and the result is `None`, unless the ingress requires an
    /// actor.
    ///
    /// # Errors
    /// - [`AuthError::Decoding`] when the header is not a valid claims object
    /// - [`AuthError::InvalidSubject`] / [`AuthError::InvalidIssuedAt`] when
    ///   the claims do not map to an actor
    /// - [`AuthError::MissingHeader`] when the header is absent and an actor
    ///   is required
    pub fn authenticate(
        &self,
        headers: &HeaderMap,
        method: &str,
    ) -> Result<Option<Action>, AuthError> {
        let raw = headers
            .get(&self.header_name)
            .map(http::HeaderValue::as_bytes)
            .filter(|raw| !raw.is_empty());

        let Some(raw) = raw else {
            if self.require_actor {
                return Err(AuthError::MissingHeader {
                    header: self.header_name.to_string(),
                });
            }
            return Ok(None);
        };

        let claims = Claims::from_json(raw)?;
        let actor = actor_from_claims(&claims)?;

        Ok(Some(Action::authenticated(actor, method)))
    }
}

/// Tower layer installing [`VerifiedActorService`] in front of gRPC services.
#[derive(Debug, Clone, Default)]
pub struct VerifiedActorLayer {
    ingress: Arc<Ingress>,
}

impl VerifiedActorLayer {
    /// Layer reading the canonical `x-verified-jwt` header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns [`ConfigError`] when the configured header name is unusable.
    pub fn from_config(cfg: &VerifiedActorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            ingress: Arc::new(Ingress::from_config(cfg)?),
        })
    }
}

impl<S> Layer<S> for VerifiedActorLayer {
    type Service = VerifiedActorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        VerifiedActorService {
            inner,
            ingress: Arc::clone(&self.ingress),
        }
    }
}

/// Attaches the verified [`Action`] to each request before calling `inner`.
///
/// Calls whose header cannot be mapped are answered with a gRPC status and
/// never reach `inner`.
#[derive(Debug, Clone)]
pub struct VerifiedActorService<S> {
    inner: S,
    ingress: Arc<Ingress>,
}

impl<S, B, ResBody> Service<Request<B>> for VerifiedActorService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let method = req.uri().path().to_owned();

        let action = match self.ingress.authenticate(req.headers(), &method) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!(method = %method, error = %err, "rejecting call: verified claims unusable");
                let response: Response<ResBody> = to_status(&err).into_http();
                return Box::pin(async move { Ok(response) });
            }
        };

        let req = match action {
            Some(action) => {
                if let Some(actor) = &action.actor {
                    tracing::debug!(
                        method = %method,
                        subject_type = %actor.subject_type,
                        subject_id = %actor.subject_id,
                        "verified actor attached"
                    );
                }
                verified_actor::with_action(req, action)
            }
            None => {
                tracing::debug!(method = %method, "no verified claims; passing through unauthenticated");
                req
            }
        };

        // Clone-swap pattern (Tower Service contract).
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move { inner.call(req).await })
    }
}
