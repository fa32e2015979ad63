//! Full-game replay through an engine session.
//!
//! Replays a finished game position by position, scoring every move against
//! the engine's preferred move and aggregating per-side accuracy. Each game
//! is analyzed at most once; later requests get the cached summary.

use std::collections::HashMap;

use coach_engine::{EngineConfig, EngineError, EngineSession, SkillTier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quality::{move_accuracy, MoveClassification};
use crate::report::ReportGenerator;

/// Standard chess starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors that can occur during game analysis.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("invalid game record: {0}")]
    InvalidGame(String),
}

/// One recorded move: the move played and the position it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedMove {
    /// The move in UCI notation.
    pub mv: String,
    /// FEN of the position after the move.
    pub fen_after: String,
}

/// Who the player faced, and how moves are attributed to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Opponent {
    /// Computer game: the player moves first, so even move indices are the
    /// player's.
    Computer,
    /// Human game: moves are attributed by the player's color.
    Human { player_is_white: bool },
}

/// A finished game as supplied by the game storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub starting_fen: String,
    pub moves: Vec<RecordedMove>,
    pub opponent: Opponent,
}

impl GameRecord {
    /// A record starting from the standard position with no moves yet.
    pub fn new(id: impl Into<String>, opponent: Opponent) -> Self {
        Self {
            id: id.into(),
            starting_fen: STARTING_FEN.to_string(),
            moves: Vec::new(),
            opponent,
        }
    }

    /// Whether the move at `index` belongs to the player rather than the
    /// opponent.
    pub fn is_player_move(&self, index: usize) -> bool {
        let white_to_move = index % 2 == 0;
        match self.opponent {
            Opponent::Computer => white_to_move,
            Opponent::Human { player_is_white } => white_to_move == player_is_white,
        }
    }
}

/// Analysis of one recorded move. Append-only and immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveAnalysisEntry {
    /// Zero-based move index.
    pub index: usize,
    /// The move that was played.
    pub played: String,
    /// The engine's preferred move in the position before; `None` when the
    /// engine reported no legal move.
    pub best: Option<String>,
    /// Accuracy in [0, 100].
    pub accuracy: f64,
    pub classification: MoveClassification,
    pub fen_before: String,
    pub fen_after: String,
    /// Centipawn evaluation of the position before the move.
    pub eval_before: i32,
    /// Centipawn evaluation of the position after the move.
    pub eval_after: i32,
}

/// Aggregated result of one full-game analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAnalysisSummary {
    pub game_id: String,
    /// Rounded average accuracy of the player's moves; 100 when the player
    /// made no moves.
    pub player_accuracy: u32,
    /// Rounded average accuracy of the opponent's moves; 100 when the
    /// opponent made no moves.
    pub opponent_accuracy: u32,
    /// Moves identical to the engine's preferred move.
    pub best_move_count: u32,
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
    pub moves: Vec<MoveAnalysisEntry>,
    /// Prose report from the external generator; empty when generation
    /// failed or no generator is wired in.
    pub report: String,
}

/// Position queries the replay loop needs, abstracted from the live engine
/// so replay logic is testable without a worker process.
pub trait PositionOracle {
    /// The engine's preferred move in `fen`, or `None` for no legal move.
    fn best_move(&mut self, fen: &str) -> Result<Option<String>, EngineError>;
    /// Centipawn evaluation of `fen`, relative to the side to move.
    fn evaluate(&mut self, fen: &str) -> Result<i32, EngineError>;
}

/// [`PositionOracle`] backed by a live [`EngineSession`].
struct EngineOracle {
    session: EngineSession,
    depth: u32,
}

impl PositionOracle for EngineOracle {
    fn best_move(&mut self, fen: &str) -> Result<Option<String>, EngineError> {
        Ok(self.session.best_move(fen)?.best_move)
    }

    fn evaluate(&mut self, fen: &str) -> Result<i32, EngineError> {
        Ok(self.session.evaluate(fen, self.depth)?.centipawns)
    }
}

/// Replays finished games and caches one summary per game.
pub struct AnalysisPipeline {
    engine_config: EngineConfig,
    tier: SkillTier,
    reporter: Box<dyn ReportGenerator>,
    cache: HashMap<String, GameAnalysisSummary>,
}

impl AnalysisPipeline {
    /// A pipeline analyzing at the strongest tier.
    pub fn new(engine_config: EngineConfig, reporter: Box<dyn ReportGenerator>) -> Self {
        Self::with_tier(engine_config, SkillTier::Legendary, reporter)
    }

    pub fn with_tier(
        engine_config: EngineConfig,
        tier: SkillTier,
        reporter: Box<dyn ReportGenerator>,
    ) -> Self {
        Self {
            engine_config,
            tier,
            reporter,
            cache: HashMap::new(),
        }
    }

    /// The cached summary for `game_id`, if the game was already analyzed.
    pub fn cached(&self, game_id: &str) -> Option<&GameAnalysisSummary> {
        self.cache.get(game_id)
    }

    /// Analyzes `record`, or returns the cached summary if this game was
    /// analyzed before.
    ///
    /// Opens one engine session for the whole replay and releases it on
    /// every exit path, including errors.
    pub fn analyze_game(&mut self, record: &GameRecord) -> Result<GameAnalysisSummary, AnalyzerError> {
        if let Some(existing) = self.cache.get(&record.id) {
            return Ok(existing.clone());
        }

        let session = EngineSession::open(&self.engine_config, self.tier)?;
        let mut oracle = EngineOracle {
            session,
            depth: self.tier.search_depth(),
        };
        let result = self.analyze_game_with(record, &mut oracle);
        oracle.session.close();
        result
    }

    /// Analysis entry point over an explicit oracle.
    ///
    /// Same caching contract as [`analyze_game`](Self::analyze_game); the
    /// oracle is untouched on a cache hit.
    pub fn analyze_game_with(
        &mut self,
        record: &GameRecord,
        oracle: &mut dyn PositionOracle,
    ) -> Result<GameAnalysisSummary, AnalyzerError> {
        if let Some(existing) = self.cache.get(&record.id) {
            tracing::debug!("Returning cached analysis for game {}", record.id);
            return Ok(existing.clone());
        }

        let mut summary = self.replay(record, oracle)?;

        summary.report = match self.reporter.generate(&summary) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(
                    "Report generation failed for game {}: {}; returning empty report",
                    record.id,
                    err
                );
                String::new()
            }
        };

        self.cache.insert(record.id.clone(), summary.clone());
        Ok(summary)
    }

    fn replay(
        &self,
        record: &GameRecord,
        oracle: &mut dyn PositionOracle,
    ) -> Result<GameAnalysisSummary, AnalyzerError> {
        let mut entries = Vec::with_capacity(record.moves.len());
        let mut player_total = 0.0;
        let mut player_count = 0u32;
        let mut opponent_total = 0.0;
        let mut opponent_count = 0u32;
        let mut best_move_count = 0u32;
        let mut inaccuracies = 0u32;
        let mut mistakes = 0u32;
        let mut blunders = 0u32;

        for (index, recorded) in record.moves.iter().enumerate() {
            if recorded.mv.is_empty() || recorded.fen_after.is_empty() {
                return Err(AnalyzerError::InvalidGame(format!(
                    "move {} is missing its move or resulting position",
                    index
                )));
            }

            let fen_before = if index == 0 {
                record.starting_fen.as_str()
            } else {
                record.moves[index - 1].fen_after.as_str()
            };

            let best = oracle.best_move(fen_before)?;
            let eval_before = oracle.evaluate(fen_before)?;

            let accuracy =
                move_accuracy(&recorded.mv, best.as_deref().unwrap_or(""), eval_before);
            let classification = MoveClassification::from_accuracy(accuracy);

            if record.is_player_move(index) {
                player_total += accuracy;
                player_count += 1;
            } else {
                opponent_total += accuracy;
                opponent_count += 1;
            }

            if best.as_deref() == Some(recorded.mv.as_str()) {
                best_move_count += 1;
            }
            match classification {
                MoveClassification::Inaccuracy => inaccuracies += 1,
                MoveClassification::Mistake => mistakes += 1,
                MoveClassification::Blunder => blunders += 1,
                MoveClassification::Excellent | MoveClassification::Good => {}
            }

            let eval_after = oracle.evaluate(&recorded.fen_after)?;

            entries.push(MoveAnalysisEntry {
                index,
                played: recorded.mv.clone(),
                best,
                accuracy,
                classification,
                fen_before: fen_before.to_string(),
                fen_after: recorded.fen_after.clone(),
                eval_before,
                eval_after,
            });
        }

        // A side that made no moves defaults to a perfect score.
        let player_accuracy = rounded_average(player_total, player_count);
        let opponent_accuracy = rounded_average(opponent_total, opponent_count);

        Ok(GameAnalysisSummary {
            game_id: record.id.clone(),
            player_accuracy,
            opponent_accuracy,
            best_move_count,
            inaccuracies,
            mistakes,
            blunders,
            moves: entries,
            report: String::new(),
        })
    }
}

fn rounded_average(total: f64, count: u32) -> u32 {
    if count == 0 {
        return 100;
    }
    (total / f64::from(count)).round() as u32
}
