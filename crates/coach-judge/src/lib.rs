//! Remote code judging and submission grading.
//!
//! Submits user code to a remote judging service, polls for terminal
//! verdicts, and grades ordered test-case sets with sample gating and hidden
//! scoring.
//!
//! - [`Language`] - supported languages and their submission harnesses
//! - [`VerdictStatus`] - the judge's status taxonomy
//! - [`JudgeClient`] - submit / await-verdict / execute round trips
//! - [`Grader`] - sample gate, hidden score, masked outputs, history append
//!
//! # Example
//!
//! ```ignore
//! use coach_judge::{Grader, JudgeClient, Language, TestCase};
//!
//! let client = JudgeClient::from_env()?;
//! let grader = Grader::new(&client);
//! let cases = vec![
//!     TestCase::sample("3\n1 2 3", "6"),
//!     TestCase::hidden("4\n1 2 3 4", "10"),
//! ];
//! let report = grader.grade(code, Language::Python, &cases);
//! println!("score: {}", report.score);
//! ```

pub mod cases;
pub mod client;
pub mod grader;
pub mod harness;
pub mod verdict;

pub use cases::{TestCase, TestOutcome, Visibility, EXECUTION_FAILED, HIDDEN_OUTPUT_SENTINEL};
pub use client::{JudgeClient, JudgeConfig, JudgeError, SubmissionResult};
pub use grader::{ExecuteCode, GradeReport, Grader, StoreError, SubmissionRecord, SubmissionStore};
pub use harness::{Language, UnsupportedLanguage};
pub use verdict::VerdictStatus;
