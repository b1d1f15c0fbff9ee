//! Display names for connected identities.

use crate::{GameError, Identity};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// One row of the user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct UserEntry {
    /// Participant identity.
    id: Identity,
    /// Display name; empty until the user sets one.
    name: String,
}

#[derive(Debug, Default)]
struct Entries {
    rows: Vec<UserEntry>,
    index: HashMap<Identity, usize>,
}

/// Mapping from identity to display name.
///
/// Entries are created on first contact and never removed.
#[derive(Debug, Default)]
pub struct UserDirectory {
    entries: Mutex<Entries>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the identity with an empty name if absent.
    ///
    /// Returns `true` when the identity was newly inserted.
    #[instrument(skip(self))]
    pub fn upsert(&self, identity: &Identity) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.index.contains_key(identity) {
            return false;
        }
        let row = entries.rows.len();
        entries.rows.push(UserEntry::new(identity.clone(), String::new()));
        entries.index.insert(identity.clone(), row);
        info!(user = %identity, total = entries.rows.len(), "New user");
        true
    }

    /// Overwrites the display name of a known identity.
    #[instrument(skip(self))]
    pub fn rename(&self, identity: &Identity, name: &str) -> Result<(), GameError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(&row) = entries.index.get(identity) else {
            warn!(user = %identity, "Rename for unknown user");
            return Err(GameError::NotFound(format!("user {}", identity)));
        };
        entries.rows[row].name = name.to_string();
        debug!(user = %identity, "User renamed");
        Ok(())
    }

    /// Returns the display name of a known identity.
    pub fn name_of(&self, identity: &Identity) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .index
            .get(identity)
            .map(|&row| entries.rows[row].name.clone())
    }

    /// Checks whether the identity has been seen.
    pub fn contains(&self, identity: &Identity) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.index.contains_key(identity)
    }

    /// Returns all users in insertion order.
    pub fn snapshot(&self) -> Vec<UserEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .clone()
    }
}
