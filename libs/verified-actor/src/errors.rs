use thiserror::Error;

/// Transport-independent classification of an [`AuthError`].
///
/// Transports map this onto their native status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request cannot be processed as sent.
    InvalidArgument,
    /// The call carries no authenticated caller.
    Unauthenticated,
    /// The service itself is miswired.
    Internal,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to decode verified claims: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("invalid subject {subject:?}: {reason}")]
    InvalidSubject { subject: String, reason: String },

    #[error("issued-at {issued_at} is out of range")]
    InvalidIssuedAt { issued_at: i64 },

    #[error("no action in context")]
    NoAction,

    #[error("no actor in context")]
    NoActor,

    #[error("missing verified header {header}")]
    MissingHeader { header: String },
}

impl AuthError {
    pub(crate) fn invalid_subject(subject: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSubject {
            subject: subject.to_owned(),
            reason: reason.into(),
        }
    }

    /// How the transport should report this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Decoding(_) | Self::InvalidSubject { .. } | Self::InvalidIssuedAt { .. } => {
                ErrorClass::InvalidArgument
            }
            Self::NoActor | Self::MissingHeader { .. } => ErrorClass::Unauthenticated,
            Self::NoAction => ErrorClass::Internal,
        }
    }
}
