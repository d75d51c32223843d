use std::collections::BTreeMap;

use crate::{data::UserSnapshot, error::Result};

pub mod directory;

pub use directory::DirectoryStore;

/// Somewhere user snapshots can be written to and read back from.
pub trait SnapshotStore {
    /// Every stored user, ordered by username.
    fn enumerate_stored_users(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<UserSnapshot>> + '_>>;

    /// Stores `snapshot`, replacing an earlier one with the same username.
    fn persist_user(&mut self, snapshot: &UserSnapshot) -> Result<()>;

    /// Removes the user if present.
    fn remove_user(&mut self, username: &str) -> Result<()>;

    fn stored_usernames(&self) -> Result<Vec<String>>;
}

/// Keeps snapshots in memory. Used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: BTreeMap<String, UserSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn enumerate_stored_users(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<UserSnapshot>> + '_>> {
        Ok(Box::new(self.users.values().cloned().map(Ok)))
    }

    fn persist_user(&mut self, snapshot: &UserSnapshot) -> Result<()> {
        self.users
            .insert(snapshot.username.clone(), snapshot.clone());
        Ok(())
    }

    fn remove_user(&mut self, username: &str) -> Result<()> {
        self.users.remove(username);
        Ok(())
    }

    fn stored_usernames(&self) -> Result<Vec<String>> {
        Ok(self.users.keys().cloned().collect())
    }
}
