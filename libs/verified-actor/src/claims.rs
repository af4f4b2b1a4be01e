use std::collections::BTreeMap;

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::errors::AuthError;

/// Claims of a token that the sidecar has already verified.
///
/// Decoding is purely syntactic. Unknown keys are ignored, and only `jti`
/// and `sub` are required. Optional claims sent as `null` take their
/// default, since sidecars may send unset lists and maps as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Token identifier - the `jti` claim.
    #[serde(rename = "jti", deserialize_with = "non_empty")]
    pub id: String,

    /// Issuer - the `iss` claim.
    #[serde(rename = "iss", default, deserialize_with = "null_as_default")]
    pub issuer: String,

    /// Subject - the `sub` claim, `<type>/<uuid>`.
    #[serde(rename = "sub")]
    pub subject: String,

    /// Audiences - the `aud` claim.
    #[serde(rename = "aud", default, deserialize_with = "null_as_default")]
    pub audience: Audience,

    /// Issued at, seconds since the epoch - the `iat` claim.
    #[serde(rename = "iat", default, deserialize_with = "null_as_default")]
    pub issued_at: i64,

    /// Expiry, seconds since the epoch - the `exp` claim.
    #[serde(rename = "exp", default, deserialize_with = "null_as_default")]
    pub expires: i64,

    /// Not before, seconds since the epoch - the `nbf` claim.
    #[serde(rename = "nbf", default, deserialize_with = "null_as_default")]
    pub not_before: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub scopes: Vec<String>,

    #[serde(rename = "claims.pentops.com/tenant", default, deserialize_with = "null_as_default")]
    pub tenant_type: String,

    #[serde(rename = "claims.pentops.com/tenantid", default, deserialize_with = "null_as_default")]
    pub tenant_id: String,

    #[serde(rename = "claims.pentops.com/realmid", default, deserialize_with = "null_as_default")]
    pub realm_id: String,

    #[serde(rename = "claims.pentops.com/actortags", default, deserialize_with = "null_as_default")]
    pub actor_tags: BTreeMap<String, String>,
}

impl Claims {
    /// Decode claims from the raw value of the trusted header.
    ///
    /// # Errors
    /// Returns [`AuthError::Decoding`] when the bytes are not a JSON claims
    /// object or a required claim is missing.
    pub fn from_json(raw: &[u8]) -> Result<Self, AuthError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Encode the claims the way the sidecar forwards them.
    ///
    /// # Errors
    /// Returns the serializer error; with string-keyed maps this does not
    /// happen in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// `iat` as an instant, if representable.
    #[must_use]
    pub fn issued_at_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.issued_at).ok()
    }

    /// `exp` as an instant, if representable.
    #[must_use]
    pub fn expires_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.expires).ok()
    }

    /// `nbf` as an instant, if representable.
    #[must_use]
    pub fn not_before_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.not_before).ok()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.is_empty() {
        return Err(D::Error::invalid_value(
            Unexpected::Str(&value),
            &"a non-empty string",
        ));
    }
    Ok(value)
}

/// The `aud` claim.
///
/// Accepts a bare string or a list on the wire and always serializes as a
/// list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience(Vec<String>);

impl Audience {
    #[must_use]
    pub fn new(audiences: Vec<String>) -> Self {
        Self(audiences)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        self.0.iter().any(|a| a == audience)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Audience {
    fn from(audience: &str) -> Self {
        Self(vec![audience.to_owned()])
    }
}

impl From<Vec<String>> for Audience {
    fn from(audiences: Vec<String>) -> Self {
        Self(audiences)
    }
}

impl Serialize for Audience {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(audience) => Ok(Self(vec![audience])),
            OneOrMany::Many(audiences) => Ok(Self(audiences)),
        }
    }
}
