use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Record holding the signed-in user
pub const USER_KEY: &str = "user";

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password";

/// Display name given to the demo account
const DEMO_NAME: &str = "Demo User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub email: String,
    pub name: String,
    pub signed_in_at: DateTime<Utc>,
}

/// The signed-in user, if any. Survives restarts through `store`.
pub struct AuthSession<S: KeyValueStore> {
    store: S,
    user: Option<UserAccount>,
}

impl<S: KeyValueStore> AuthSession<S> {
    /// Restore the session from `store`. An unreadable record means
    /// signed out.
    pub fn load(store: S) -> Self {
        let user = match store.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<UserAccount>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(record = USER_KEY, error = %e, "Ignoring malformed user record");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(record = USER_KEY, error = %e, "Failed to read user record");
                None
            }
        };
        Self { store, user }
    }

    /// Sign in with the demo credentials. `Ok(false)` on a mismatch.
    pub fn login(&mut self, email: &str, password: &str) -> Result<bool, StorageError> {
        if email != DEMO_EMAIL || password != DEMO_PASSWORD {
            info!(email = email, "Login rejected");
            return Ok(false);
        }

        let user = UserAccount {
            email: email.to_string(),
            name: DEMO_NAME.to_string(),
            signed_in_at: Utc::now(),
        };
        let encoded = serde_json::to_string(&user).map_err(|source| StorageError::Encode {
            key: USER_KEY.to_string(),
            source,
        })?;
        self.store.set(USER_KEY, &encoded)?;
        self.user = Some(user);
        info!(email = email, "Signed in");
        Ok(true)
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.store.remove(USER_KEY)?;
        self.user = None;
        Ok(())
    }

    pub fn user(&self) -> Option<&UserAccount> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_login_with_demo_credentials() {
        let mut session = AuthSession::load(MemoryStore::new());
        assert!(!session.is_authenticated());
        assert!(session.login(DEMO_EMAIL, DEMO_PASSWORD).expect("login should not fail"));
        assert!(session.is_authenticated());
        assert_eq!(session.user().map(|u| u.name.as_str()), Some("Demo User"));
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let mut session = AuthSession::load(MemoryStore::new());
        assert!(!session.login(DEMO_EMAIL, "hunter2").expect("login should not fail"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_session_survives_restart_until_logout() {
        let store = MemoryStore::new();
        let mut session = AuthSession::load(store.clone());
        session.login(DEMO_EMAIL, DEMO_PASSWORD).expect("login should not fail");

        let mut restored = AuthSession::load(store.clone());
        assert!(restored.is_authenticated());
        restored.logout().expect("logout should not fail");

        assert!(!AuthSession::load(store).is_authenticated());
    }

    #[test]
    fn test_malformed_user_record_means_signed_out() {
        let mut store = MemoryStore::new();
        store.set(USER_KEY, "not json").expect("set");
        assert!(!AuthSession::load(store).is_authenticated());
    }
}
