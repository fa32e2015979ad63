//! Explicitly owned engine sessions, one per active game.
//!
//! Instead of an ambient shared engine, each game that needs a worker gets
//! its own handle, indexed by game identifier. The arena owns every session
//! it opens and closes them on release or teardown.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::session::{EngineConfig, EngineError, EngineSession};
use crate::tier::SkillTier;

/// Owns at most one [`EngineSession`] per game identifier.
pub struct SessionArena {
    config: EngineConfig,
    sessions: HashMap<String, EngineSession>,
}

impl SessionArena {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Returns the session for `game_id`, opening one at `tier` if none
    /// exists yet. An existing session keeps the tier it was opened with.
    pub fn acquire(
        &mut self,
        game_id: &str,
        tier: SkillTier,
    ) -> Result<&mut EngineSession, EngineError> {
        match self.sessions.entry(game_id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                tracing::debug!("Opening engine session for game {}", game_id);
                Ok(entry.insert(EngineSession::open(&self.config, tier)?))
            }
        }
    }

    /// Closes and removes the session for `game_id`, if any.
    pub fn release(&mut self, game_id: &str) {
        if let Some(mut session) = self.sessions.remove(game_id) {
            session.close();
        }
    }

    /// Closes every owned session.
    pub fn release_all(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            session.close();
        }
    }

    /// Number of currently open sessions.
    pub fn active(&self) -> usize {
        self.sessions.len()
    }
}

impl Drop for SessionArena {
    fn drop(&mut self) {
        self.release_all();
    }
}
