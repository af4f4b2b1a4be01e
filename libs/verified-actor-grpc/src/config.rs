use http::HeaderName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use verified_actor::VERIFIED_JWT_HEADER;

/// Configuration of the verified-actor ingress layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct VerifiedActorConfig {
    /// Metadata key the sidecar writes the verified claims to.
    pub header_name: String,

    /// Reject calls that arrive without the header instead of passing them
    /// through unauthenticated.
    pub require_actor: bool,
}

impl Default for VerifiedActorConfig {
    fn default() -> Self {
        Self {
            header_name: VERIFIED_JWT_HEADER.to_owned(),
            require_actor: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid header name {name:?}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("header {0:?} is a binary metadata key; verified claims are sent as text")]
    BinaryHeader(String),
}

impl VerifiedActorConfig {
    /// Check the configuration and return the normalized header name.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `header_name` is not a valid text metadata
    /// key.
    pub fn validate(&self) -> Result<HeaderName, ConfigError> {
        let name = HeaderName::from_bytes(self.header_name.as_bytes()).map_err(|source| {
            ConfigError::InvalidHeaderName {
                name: self.header_name.clone(),
                source,
            }
        })?;

        if name.as_str().ends_with("-bin") {
            return Err(ConfigError::BinaryHeader(self.header_name.clone()));
        }

        Ok(name)
    }
}
