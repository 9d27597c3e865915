use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::store::{load_user_ids, save_user_ids};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptInOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptOutOutcome {
    Removed,
    NotPresent,
}

#[derive(Debug, Default)]
struct RegistryState {
    users: HashSet<u64>,
    dirty: bool,
}

/// Users who agreed to receive calendar DMs.
///
/// Every mutation is saved while the write lock is held, so saves never
/// interleave with each other or with another mutation. A failed save keeps
/// the in-memory change and leaves the registry dirty for `flush`.
#[derive(Debug)]
pub struct OptInRegistry {
    path: PathBuf,
    state: RwLock<RegistryState>,
}

impl OptInRegistry {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let users = load_user_ids(&path).await?;
        info!(path = %path.display(), count = users.len(), "loaded opted-in users");
        Ok(Self {
            path,
            state: RwLock::new(RegistryState { users, dirty: false }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn contains(&self, user_id: u64) -> bool {
        self.state.read().await.users.contains(&user_id)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn snapshot(&self) -> HashSet<u64> {
        self.state.read().await.users.clone()
    }

    pub async fn is_dirty(&self) -> bool {
        self.state.read().await.dirty
    }

    pub async fn opt_in(&self, user_id: u64) -> OptInOutcome {
        let mut state = self.state.write().await;
        if !state.users.insert(user_id) {
            return OptInOutcome::AlreadyPresent;
        }
        self.persist(&mut state).await;
        OptInOutcome::Added
    }

    pub async fn opt_out(&self, user_id: u64) -> OptOutOutcome {
        let mut state = self.state.write().await;
        if !state.users.remove(&user_id) {
            return OptOutOutcome::NotPresent;
        }
        self.persist(&mut state).await;
        OptOutOutcome::Removed
    }

    /// Writes the full set unconditionally.
    pub async fn save(&self) -> Result<(), PersistenceError> {
        let mut state = self.state.write().await;
        save_user_ids(&self.path, &state.users).await?;
        state.dirty = false;
        Ok(())
    }

    /// Writes the set only if an earlier save failed.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let mut state = self.state.write().await;
        if !state.dirty {
            return Ok(());
        }
        save_user_ids(&self.path, &state.users).await?;
        state.dirty = false;
        info!(count = state.users.len(), "flushed opted-in users");
        Ok(())
    }

    async fn persist(&self, state: &mut RegistryState) {
        match save_user_ids(&self.path, &state.users).await {
            Ok(()) => state.dirty = false,
            Err(err) => {
                warn!(error = %err, "failed to save opted-in users, will retry on flush");
                state.dirty = true;
            }
        }
    }
}
