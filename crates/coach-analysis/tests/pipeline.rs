//! End-to-end pipeline tests against a scripted stand-in engine.
//!
//! The stand-in is the same small shell script the engine crate tests with:
//! it always prefers e2e4 and scores every position at 34 centipawns, which
//! makes the expected accuracies exact.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use coach_analysis::{
    AnalysisPipeline, GameRecord, MoveClassification, NoReport, Opponent, RecordedMove,
    STARTING_FEN,
};
use coach_engine::{EngineConfig, SkillTier};
use tempfile::TempDir;

const RESPONSES: &str = r#"    uci) printf 'id name FakeFish\nuciok\n' ;;
    isready) printf 'readyok\n' ;;
    go*) printf 'info depth 12 score cp 34 nodes 1000 pv e2e4\nbestmove e2e4 ponder e7e5\n' ;;
    quit) exit 0 ;;
    *) : ;;"#;

fn fake_engine(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("fake-engine.sh");
    let script = format!(
        "#!/bin/sh\nwhile IFS= read -r line; do\n  case \"$line\" in\n{RESPONSES}\n  esac\ndone\n"
    );
    fs::write(&path, script).expect("write fake engine script");
    let mut perms = fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

fn two_move_game(id: &str) -> GameRecord {
    GameRecord {
        id: id.to_string(),
        starting_fen: STARTING_FEN.to_string(),
        moves: vec![
            RecordedMove {
                mv: "e2e4".to_string(),
                fen_after: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
                    .to_string(),
            },
            RecordedMove {
                mv: "a7a6".to_string(),
                fen_after: "rnbqkbnr/1ppppppp/p7/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
                    .to_string(),
            },
        ],
        opponent: Opponent::Computer,
    }
}

#[test]
fn test_analyze_game_scores_a_full_replay() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::new(fake_engine(&dir));
    let mut pipeline =
        AnalysisPipeline::with_tier(config, SkillTier::Intermediate, Box::new(NoReport));

    let summary = pipeline.analyze_game(&two_move_game("game-1")).unwrap();

    // The player matched the engine's move; the opponent's unrelated reply
    // scores 100 - 34/5 = 93.2, rounded to 93.
    assert_eq!(summary.player_accuracy, 100);
    assert_eq!(summary.opponent_accuracy, 93);
    assert_eq!(summary.best_move_count, 1);
    assert_eq!(summary.inaccuracies, 0);
    assert_eq!(summary.mistakes, 0);
    assert_eq!(summary.blunders, 0);

    assert_eq!(summary.moves.len(), 2);
    assert_eq!(summary.moves[0].best.as_deref(), Some("e2e4"));
    assert_eq!(summary.moves[0].classification, MoveClassification::Excellent);
    assert_eq!(summary.moves[0].eval_before, 34);
    assert_eq!(summary.moves[1].fen_before, summary.moves[0].fen_after);
    assert_eq!(summary.report, "");
}

#[test]
fn test_second_analysis_skips_the_engine() {
    let dir = TempDir::new().unwrap();
    let engine_path = fake_engine(&dir);
    let config = EngineConfig::new(&engine_path);
    let mut pipeline =
        AnalysisPipeline::with_tier(config, SkillTier::Intermediate, Box::new(NoReport));

    let first = pipeline.analyze_game(&two_move_game("game-2")).unwrap();

    // The cached path never launches a process, so it succeeds even after
    // the engine binary disappears.
    fs::remove_file(&engine_path).unwrap();
    let second = pipeline.analyze_game(&two_move_game("game-2")).unwrap();

    assert_eq!(second.player_accuracy, first.player_accuracy);
    assert_eq!(second.moves.len(), first.moves.len());
}

#[test]
fn test_distinct_games_are_analyzed_separately() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::new(fake_engine(&dir));
    let mut pipeline =
        AnalysisPipeline::with_tier(config, SkillTier::Advanced, Box::new(NoReport));

    pipeline.analyze_game(&two_move_game("game-3")).unwrap();
    pipeline.analyze_game(&two_move_game("game-4")).unwrap();

    assert!(pipeline.cached("game-3").is_some());
    assert!(pipeline.cached("game-4").is_some());
}
