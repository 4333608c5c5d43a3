use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::TraitRatings;
use crate::storage::{self, LocalStore, StorageKey};

/// Whether this device voted, and what it submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteState {
    pub has_voted: bool,
    pub submitted_ratings: Option<TraitRatings>,
    /// Unix epoch milliseconds
    pub voted_at: Option<i64>,
}

impl VoteState {
    pub fn not_voted() -> Self {
        Self::default()
    }

    /// The submitted ratings, only when the vote is complete
    pub fn ratings(&self) -> Option<TraitRatings> {
        if self.has_voted {
            self.submitted_ratings
        } else {
            None
        }
    }
}

/// Persisted vote-once state for this device
pub struct VoteLedger {
    store: Arc<dyn LocalStore>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn has_voted(&self) -> bool {
        self.state().has_voted
    }

    /// Current state. Partial or corrupt documents read as not voted.
    pub fn state(&self) -> VoteState {
        let Some(state) = storage::read_json::<VoteState>(self.store.as_ref(), StorageKey::VoteState) else {
            return VoteState::not_voted();
        };

        match state.ratings() {
            Some(ratings) if ratings.is_in_scale() => state,
            Some(_) => {
                warn!("Discarding vote state with out-of-range ratings");
                storage::discard(self.store.as_ref(), StorageKey::VoteState);
                VoteState::not_voted()
            }
            None => VoteState::not_voted(),
        }
    }

    /// Mark this device as voted. A second call overwrites the first.
    pub fn record_vote(&self, ratings: TraitRatings, now: i64) -> Result<VoteState> {
        let state = VoteState {
            has_voted: true,
            submitted_ratings: Some(ratings),
            voted_at: Some(now),
        };
        storage::write_json(self.store.as_ref(), StorageKey::VoteState, &state)?;

        info!("Recorded vote for this device");
        Ok(state)
    }

    /// Reset all derived state when the stored app version differs from `current_version`.
    /// Returns whether a reset happened. Nothing is reset if the marker cannot be read.
    pub fn app_version_gate(&self, current_version: &str) -> Result<bool> {
        let stored = self
            .store
            .get(StorageKey::AppVersion)
            .context("Failed to read app version marker")?;

        if stored.as_deref() == Some(current_version) {
            return Ok(false);
        }

        match &stored {
            Some(previous) => info!("App version changed from {} to {}, resetting local state", previous, current_version),
            None => info!("No app version recorded, initializing local state for {}", current_version),
        }

        for key in StorageKey::DERIVED {
            self.store.remove(key)?;
        }
        self.store.set(StorageKey::AppVersion, current_version)?;

        Ok(true)
    }
}
