//! Post-game analysis built on a live engine session.
//!
//! Replays finished games through the engine, scores every move against the
//! engine's preferred move, and aggregates a per-game summary with per-side
//! accuracy and quality counts.
//!
//! - [`AnalysisPipeline`] - replay, score, cache, report
//! - [`MoveClassification`] - accuracy thresholds for move quality
//! - [`ReportGenerator`] - seam to an external prose-report service
//!
//! # Example
//!
//! ```ignore
//! use coach_analysis::{AnalysisPipeline, GameRecord, NoReport, Opponent};
//! use coach_engine::EngineConfig;
//!
//! let mut pipeline = AnalysisPipeline::new(EngineConfig::discover(), Box::new(NoReport));
//! let record = GameRecord::new("game-42", Opponent::Computer);
//! let summary = pipeline.analyze_game(&record)?;
//! println!("player accuracy: {}", summary.player_accuracy);
//! ```

pub mod analyzer;
pub mod quality;
pub mod report;

pub use analyzer::{
    AnalysisPipeline, AnalyzerError, GameAnalysisSummary, GameRecord, MoveAnalysisEntry, Opponent,
    PositionOracle, RecordedMove, STARTING_FEN,
};
pub use quality::{move_accuracy, moves_similar, MoveClassification};
pub use report::{NoReport, ReportError, ReportGenerator};
