//! # Media Arbiter
//!
//! At most one audio/video player plays at a time across a page. Every
//! media block registers with one shared arbiter; claiming a slot pauses
//! whichever player held it before.
//!
//! The arbiter is a cheap cloneable handle passed to renderers and
//! players, never a global.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Slot of one player, stable for a given block id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaHandle(String);

impl MediaHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Default)]
struct ArbiterState {
    players: BTreeMap<MediaHandle, PlayerState>,
    current: Option<MediaHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct MediaArbiter {
    state: Arc<Mutex<ArbiterState>>,
}

impl MediaArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ArbiterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a player; registering the same block twice returns the same handle
    pub fn register(&self, block_id: &str) -> MediaHandle {
        let handle = MediaHandle(format!("media-{}", block_id));
        self.lock()
            .players
            .entry(handle.clone())
            .or_insert(PlayerState::Idle);
        handle
    }

    /// Start playing `handle`. Returns the player that was paused to make room.
    pub fn claim(&self, handle: &MediaHandle) -> Option<MediaHandle> {
        let mut state = self.lock();
        if state.current.as_ref() == Some(handle) {
            return None;
        }

        let paused = state.current.take();
        if let Some(previous) = &paused {
            state.players.insert(previous.clone(), PlayerState::Paused);
        }
        state.players.insert(handle.clone(), PlayerState::Playing);
        state.current = Some(handle.clone());

        debug!(player = %handle, paused = ?paused, "Media claimed");
        paused
    }

    /// Stop playing `handle` if it is the current player
    pub fn release(&self, handle: &MediaHandle) {
        let mut state = self.lock();
        if state.current.as_ref() == Some(handle) {
            state.current = None;
            state.players.insert(handle.clone(), PlayerState::Paused);
        }
    }

    pub fn current(&self) -> Option<MediaHandle> {
        self.lock().current.clone()
    }

    pub fn state(&self, handle: &MediaHandle) -> Option<PlayerState> {
        self.lock().players.get(handle).copied()
    }

    /// Number of players currently playing (0 or 1)
    pub fn playing_count(&self) -> usize {
        self.lock()
            .players
            .values()
            .filter(|s| **s == PlayerState::Playing)
            .count()
    }
}
