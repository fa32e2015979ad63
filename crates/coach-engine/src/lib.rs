//! UCI analysis-engine session management.
//!
//! Supervises one external analysis-engine process per session and turns its
//! line-oriented output into best-move and evaluation answers.
//!
//! - [`SkillTier`] - named difficulty presets (skill level + search depth)
//! - [`EngineSession`] - one owned worker process, serialized queries
//! - [`SessionArena`] - per-game session handles indexed by game id
//! - [`best_move_for`] - one-shot open/query/close seam for route handlers
//!
//! # Example
//!
//! ```ignore
//! use coach_engine::{best_move_for, EngineConfig, SkillTier};
//!
//! let config = EngineConfig::discover();
//! let mv = best_move_for(&config, "startpos fen ...", SkillTier::Grandmaster)?;
//! ```

pub mod arena;
pub mod session;
pub mod tier;

pub use arena::SessionArena;
pub use session::{EngineConfig, EngineError, EngineSession, EvaluationResult, MoveResult};
pub use tier::{SkillTier, UnknownTier};

/// Answers a single best-move query with a short-lived session.
///
/// Opens a worker at `tier`, runs one query, and closes the worker on every
/// exit path. Returns `None` when the position has no legal move.
pub fn best_move_for(
    config: &EngineConfig,
    fen: &str,
    tier: SkillTier,
) -> Result<Option<String>, EngineError> {
    let mut session = EngineSession::open(config, tier)?;
    let result = session.best_move(fen);
    session.close();
    result.map(|r| r.best_move)
}
