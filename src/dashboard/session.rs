//! Tab-scoped login sessions.
//!
//! A tab holds at most one identity, stored as JSON under a single key. The
//! gate is handed to whoever needs the identity; nothing reads it ambiently.

use crate::{
    core::{
        Facade,
        auth::{Identity, LoginOutcome},
    },
    dashboard::menu::Menu,
    errors::Result,
};
use std::collections::HashMap;
use tracing::{info, warn};

/// Storage key holding the serialized identity
pub const SESSION_KEY: &str = "user";

/// Key/value storage that lives as long as one browser tab.
pub trait TabStorage {
    /// Value stored under `key`
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: String);
    /// Removes every key
    fn clear(&mut self);
}

/// In-process [`TabStorage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTabStorage {
    entries: HashMap<String, String>,
}

impl TabStorage for MemoryTabStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Login state of one tab.
#[derive(Debug, Clone, Default)]
pub struct SessionGate<S> {
    storage: S,
}

impl<S: TabStorage> SessionGate<S> {
    /// A gate over `storage`
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Checks the credentials and, on success, keeps the identity in the tab.
    ///
    /// # Errors
    /// Storage failures from the facade. A refused login is an `Ok` outcome.
    pub async fn login(
        &mut self,
        facade: &Facade,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome> {
        let outcome = facade.authenticate(email, password).await?;
        match &outcome {
            LoginOutcome::Authenticated(identity) => {
                self.storage
                    .set(SESSION_KEY, serde_json::to_string(identity)?);
                info!(email = %identity.email, role = %identity.role, "Logged in");
            }
            LoginOutcome::Rejected(failure) => {
                info!(%failure, "Login refused");
            }
        }
        Ok(outcome)
    }

    /// The identity restored from the tab, if one is stored.
    ///
    /// Unreadable session data counts as logged out.
    pub fn current(&self) -> Option<Identity> {
        let raw = self.storage.get(SESSION_KEY)?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!("Discarding unreadable session: {e}"))
            .ok()
    }

    /// Forgets the identity.
    pub fn logout(&mut self) {
        self.storage.clear();
    }

    /// Menu for the logged-in role
    pub fn menu(&self) -> Option<Menu> {
        self.current().map(|identity| Menu::for_role(identity.role))
    }
}
