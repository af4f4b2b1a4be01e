use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::claims::Claims;
use crate::errors::AuthError;

/// The authenticated caller, derived from verified [`Claims`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub subject_id: Uuid,
    pub subject_type: String,
    #[serde(default)]
    pub actor_tags: BTreeMap<String, String>,
    pub claim: Claim,
    pub authentication_method: AuthenticationMethod,
}

/// Tenancy and capabilities the caller holds for this call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default)]
    pub scopes: Vec<String>,
    pub tenant_type: String,
    pub tenant_id: String,
    pub realm_id: String,
}

/// How the caller proved its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthenticationMethod {
    /// A token verified by the sidecar.
    Jwt {
        token_id: String,
        issuer: String,
        #[serde(with = "time::serde::rfc3339")]
        issued_at: OffsetDateTime,
    },
}

/// Derive the [`Actor`] for a set of verified claims.
///
/// The subject must be exactly `<type>/<uuid>` with both segments non-empty.
/// The function is pure; the same claims always produce the same actor.
///
/// # Errors
/// Returns [`AuthError::InvalidSubject`] when the subject does not have that
/// shape, and [`AuthError::InvalidIssuedAt`] when `iat` cannot be represented
/// as an instant.
pub fn actor_from_claims(claims: &Claims) -> Result<Actor, AuthError> {
    let (subject_type, subject_id) = parse_subject(&claims.subject)?;

    let issued_at = OffsetDateTime::from_unix_timestamp(claims.issued_at).map_err(|_| {
        AuthError::InvalidIssuedAt {
            issued_at: claims.issued_at,
        }
    })?;

    Ok(Actor {
        subject_id,
        subject_type: subject_type.to_owned(),
        actor_tags: claims.actor_tags.clone(),
        claim: Claim {
            scopes: claims.scopes.clone(),
            tenant_type: claims.tenant_type.clone(),
            tenant_id: claims.tenant_id.clone(),
            realm_id: claims.realm_id.clone(),
        },
        authentication_method: AuthenticationMethod::Jwt {
            token_id: claims.id.clone(),
            issuer: claims.issuer.clone(),
            issued_at,
        },
    })
}

fn parse_subject(subject: &str) -> Result<(&str, Uuid), AuthError> {
    let mut parts = subject.split('/');
    let (Some(subject_type), Some(raw_id), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::invalid_subject(
            subject,
            "expected exactly two '/'-separated segments",
        ));
    };

    if subject_type.is_empty() {
        return Err(AuthError::invalid_subject(subject, "subject type is empty"));
    }
    if raw_id.is_empty() {
        return Err(AuthError::invalid_subject(subject, "subject id is empty"));
    }

    let subject_id = Uuid::parse_str(raw_id)
        .map_err(|e| AuthError::invalid_subject(subject, format!("subject id is not a UUID: {e}")))?;

    Ok((subject_type, subject_id))
}
