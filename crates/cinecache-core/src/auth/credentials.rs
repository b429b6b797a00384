//! Catalog API key in the OS keychain.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "cinecache";

/// Keychain account the catalog API key is stored under
const API_KEY_ACCOUNT: &str = "catalog-api-key";

pub struct CredentialStore;

impl CredentialStore {
    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, API_KEY_ACCOUNT).context("Failed to open keychain entry")
    }

    pub fn store_api_key(api_key: &str) -> Result<()> {
        Self::entry()?
            .set_password(api_key.trim())
            .context("Failed to store API key in keychain")
    }

    pub fn get_api_key() -> Result<String> {
        Self::entry()?
            .get_password()
            .context("No API key in keychain")
    }

    /// Forget the stored key. Succeeds when none was stored.
    pub fn delete_api_key() -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete API key from keychain"),
        }
    }
}
