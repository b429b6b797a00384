//! Authentication module for the demo login and the API key.
//!
//! This module provides:
//! - `AuthSession`: the signed-in user, persisted in the user-state store
//! - `CredentialStore`: the catalog API key in the OS keychain via keyring
//!
//! The login check is a plain comparison against configured demo
//! credentials; it guards nothing.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{AuthSession, UserAccount, DEMO_EMAIL, DEMO_PASSWORD, USER_KEY};
