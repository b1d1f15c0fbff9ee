//! Anonymous per-browser identity carried in a signed cookie.

use crate::Identity;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use tracing::{debug, info, instrument, warn};

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "strictly_session";

/// Resolves inbound requests to a stable [`Identity`].
///
/// The cookie is signed with the gateway's key. A cookie that fails
/// verification, or whose value is not an issued identity, is replaced.
#[derive(Clone)]
pub struct SessionGateway {
    cookie_name: String,
    key: Key,
}

impl SessionGateway {
    /// Creates a gateway reading and issuing the named cookie, signed with `key`.
    #[instrument(skip(key))]
    pub fn new(cookie_name: impl Into<String> + std::fmt::Debug, key: Key) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            key,
        }
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Signing key for the session cookie.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns the caller's identity, issuing one if no valid cookie is present.
    ///
    /// The returned jar carries the new cookie when one was issued and must
    /// be part of the response.
    #[instrument(skip(self, jar))]
    pub fn resolve(&self, jar: SignedCookieJar) -> (SignedCookieJar, Identity) {
        if let Some(cookie) = jar.get(&self.cookie_name) {
            if let Some(identity) = Identity::parse_issued(cookie.value()) {
                debug!(user = %identity, "Existing session");
                return (jar, identity);
            }
            warn!("Session cookie is not an issued identity");
        }

        let identity = Identity::generate();
        info!(user = %identity, "Issued new session");
        let cookie = Cookie::build((self.cookie_name.clone(), identity.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/");
        (jar.add(cookie), identity)
    }
}

impl std::fmt::Debug for SessionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGateway")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl Default for SessionGateway {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME, Key::generate())
    }
}
