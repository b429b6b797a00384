//! Durable user state: favorites and display preferences.
//!
//! `UserState` owns its store. Create it once at startup with
//! `UserState::load` and pass it to whatever needs it; every mutation is
//! persisted before the call returns.

pub mod user;

pub use user::{UserState, FAVORITES_KEY, LAST_SEARCH_KEY, VIEW_MODE_KEY};
