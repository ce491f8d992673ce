//! Session credential types.
//!
//! The backend issues bearer tokens; this crate only carries them around.

use secrecy::{ExposeSecret, SecretString};

/// Opaque bearer token proving an authenticated session.
///
/// Never parsed or validated locally. `Debug` output is redacted so tokens
/// cannot leak through logs.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for forwarding in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Format as an HTTP bearer credential.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}
