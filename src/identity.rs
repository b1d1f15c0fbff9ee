//! Anonymous participant identity.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// Opaque per-session token identifying a participant.
///
/// Issued by the session gateway and stable for the lifetime of one
/// browser session. The core only compares, hashes and displays it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Issues a fresh random identity.
    #[instrument]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts a token only if it has the shape of an issued identity.
    ///
    /// Issued identities are UUIDs, so arbitrary strings such as `"draw"`
    /// never become identities.
    pub fn parse_issued(token: &str) -> Option<Self> {
        Uuid::parse_str(token).ok().map(|uuid| Self(uuid.to_string()))
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}
