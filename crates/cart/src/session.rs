//! Session presence and bearer-token bookkeeping.
//!
//! Tokens are issued by the backend and stored per role. A session is present
//! when any configured role holds a token; roles are checked in the order
//! they are configured, so the first one wins when several are signed in.

use mystore_core::SessionToken;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::storage::{SharedStorage, StorageError};

/// Role name for storefront customers.
pub const CUSTOMER_ROLE: &str = "customer";

/// Role name for store administrators.
pub const ADMIN_ROLE: &str = "admin";

/// Errors that can occur when changing session state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No role with this name is configured.
    #[error("Unknown session role: {0}")]
    UnknownRole(String),

    /// The token is empty.
    #[error("Session token cannot be empty")]
    EmptyToken,

    /// Writing to storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A named session role and the storage key holding its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRole {
    /// Role name (e.g., `customer`).
    pub name: String,
    /// Storage key of the role's bearer token.
    pub storage_key: String,
}

impl SessionRole {
    /// Create a role.
    #[must_use]
    pub fn new(name: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_key: storage_key.into(),
        }
    }

    /// Customer first, then admin, using the storefront's historical keys.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(CUSTOMER_ROLE, "userToken"),
            Self::new(ADMIN_ROLE, "adminAuthToken"),
        ]
    }
}

/// A token found in storage, with the role it belongs to.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Name of the role that holds the token.
    pub role: String,
    /// The bearer token.
    pub token: SessionToken,
}

/// Read/write access to the session tokens of all configured roles.
pub struct Session {
    storage: SharedStorage,
    roles: Vec<SessionRole>,
}

impl Session {
    /// Create a session view over `storage` with roles in priority order.
    #[must_use]
    pub fn new(storage: SharedStorage, roles: Vec<SessionRole>) -> Self {
        Self { storage, roles }
    }

    /// The first role in priority order that holds a non-empty token.
    ///
    /// Unreadable storage counts as "no token" for that role.
    #[must_use]
    pub fn active_credential(&self) -> Option<Credential> {
        self.roles.iter().find_map(|role| {
            match self.storage.get(&role.storage_key) {
                Ok(Some(token)) if !token.trim().is_empty() => Some(Credential {
                    role: role.name.clone(),
                    token: SessionToken::new(token),
                }),
                Ok(_) => None,
                Err(e) => {
                    warn!(role = %role.name, error = %e, "Failed to read session token");
                    None
                }
            }
        })
    }

    /// Whether any role is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.active_credential().is_some()
    }

    /// Record a backend-issued token for `role`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownRole` if `role` is not configured,
    /// `SessionError::EmptyToken` for a blank token, or a storage error.
    #[instrument(skip(self, token))]
    pub fn sign_in(&self, role: &str, token: &SessionToken) -> Result<(), SessionError> {
        let role = self
            .roles
            .iter()
            .find(|r| r.name == role)
            .ok_or_else(|| SessionError::UnknownRole(role.to_string()))?;

        if token.expose().trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }

        self.storage.set(&role.storage_key, token.expose())?;
        info!(role = %role.name, "Signed in");
        Ok(())
    }

    /// Remove the tokens of every role.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a token cannot be removed.
    #[instrument(skip(self))]
    pub fn sign_out(&self) -> Result<(), SessionError> {
        for role in &self.roles {
            self.storage.remove(&role.storage_key)?;
        }
        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{MemoryStorage, Storage};

    fn session() -> (Arc<MemoryStorage>, Session) {
        let storage = MemoryStorage::shared();
        let session = Session::new(storage.clone(), SessionRole::defaults());
        (storage, session)
    }

    #[test]
    fn test_no_tokens_means_signed_out() {
        let (_, session) = session();
        assert!(!session.is_signed_in());
        assert!(session.active_credential().is_none());
    }

    #[test]
    fn test_admin_token_alone_satisfies_session() {
        let (storage, session) = session();
        storage.set("adminAuthToken", "admin-jwt").unwrap();

        let credential = session.active_credential().unwrap();
        assert_eq!(credential.role, ADMIN_ROLE);
        assert_eq!(credential.token.expose(), "admin-jwt");
    }

    #[test]
    fn test_customer_token_has_priority() {
        let (storage, session) = session();
        storage.set("adminAuthToken", "admin-jwt").unwrap();
        storage.set("userToken", "customer-jwt").unwrap();

        let credential = session.active_credential().unwrap();
        assert_eq!(credential.role, CUSTOMER_ROLE);
        assert_eq!(credential.token.expose(), "customer-jwt");
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let (storage, session) = session();
        storage.set("userToken", "  ").unwrap();
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_sign_in_and_out() {
        let (storage, session) = session();
        session
            .sign_in(CUSTOMER_ROLE, &SessionToken::new("jwt"))
            .unwrap();
        assert_eq!(storage.get("userToken").unwrap().as_deref(), Some("jwt"));

        storage.set("adminAuthToken", "admin-jwt").unwrap();
        session.sign_out().unwrap();
        assert!(!session.is_signed_in());
        assert_eq!(storage.get("adminAuthToken").unwrap(), None);
    }

    #[test]
    fn test_sign_in_rejects_unknown_role_and_blank_token() {
        let (_, session) = session();
        assert!(matches!(
            session.sign_in("vendor", &SessionToken::new("jwt")),
            Err(SessionError::UnknownRole(_))
        ));
        assert!(matches!(
            session.sign_in(CUSTOMER_ROLE, &SessionToken::new("")),
            Err(SessionError::EmptyToken)
        ));
    }

    #[test]
    fn test_added_role_is_a_config_change() {
        let storage = MemoryStorage::shared();
        let mut roles = SessionRole::defaults();
        roles.push(SessionRole::new("vendor", "vendorToken"));
        let session = Session::new(storage.clone(), roles);

        storage.set("vendorToken", "v").unwrap();
        assert_eq!(session.active_credential().unwrap().role, "vendor");
    }
}
