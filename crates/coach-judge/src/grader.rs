//! Pass/fail decision and scoring for one submission against one question.
//!
//! Sample cases gate the hidden ones: hidden cases only run when every
//! sample passed. The score is the rounded percentage of passing hidden
//! cases; samples never contribute to the score.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::cases::{TestCase, TestOutcome, Visibility};
use crate::client::JudgeClient;
use crate::harness::Language;

/// Something that can run test cases for submitted code.
///
/// Implemented by [`JudgeClient`]; test code substitutes stubs. The returned
/// sequence must contain one outcome per input case, in input order.
pub trait ExecuteCode {
    fn execute(&self, code: &str, cases: &[TestCase], language: Language) -> Vec<TestOutcome>;
}

impl ExecuteCode for JudgeClient {
    fn execute(&self, code: &str, cases: &[TestCase], language: Language) -> Vec<TestOutcome> {
        JudgeClient::execute(self, code, cases, language)
    }
}

/// Error from the submission history store.
#[derive(Error, Debug)]
#[error("submission store error: {0}")]
pub struct StoreError(pub String);

/// Append-only persistence for graded submissions.
///
/// Implemented by the surrounding storage layer. Store failures never fail
/// the grading response; the grader logs them and moves on.
pub trait SubmissionStore {
    fn append(&self, record: &SubmissionRecord) -> Result<(), StoreError>;
}

/// The immutable record appended to the submitter's history.
///
/// Hidden outcomes are stored unmasked; masking only applies to what goes
/// back to the submitter.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    pub code: String,
    pub language: Language,
    pub samples: Vec<TestOutcome>,
    pub hidden: Vec<TestOutcome>,
    pub score: u32,
    pub executed_at: DateTime<Utc>,
}

/// What the submitter gets back.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    /// Rounded percentage of passing hidden cases; 0 when samples failed or
    /// there were no hidden cases.
    pub score: u32,
    /// Fully correct: every hidden case passed.
    pub passed: bool,
    pub samples: Vec<TestOutcome>,
    /// Hidden outcomes with actual output masked. Empty when samples failed
    /// (hidden cases were not attempted).
    pub hidden: Vec<TestOutcome>,
}

/// Grades one code submission against one question's test cases.
pub struct Grader<'a> {
    executor: &'a dyn ExecuteCode,
    store: Option<&'a dyn SubmissionStore>,
}

impl<'a> Grader<'a> {
    pub fn new(executor: &'a dyn ExecuteCode) -> Self {
        Self {
            executor,
            store: None,
        }
    }

    /// Grades with submission-history persistence.
    pub fn with_store(executor: &'a dyn ExecuteCode, store: &'a dyn SubmissionStore) -> Self {
        Self {
            executor,
            store: Some(store),
        }
    }

    /// Grades a mixed list of cases, partitioned by visibility.
    pub fn grade(&self, code: &str, language: Language, cases: &[TestCase]) -> GradeReport {
        let (samples, hidden): (Vec<TestCase>, Vec<TestCase>) = cases
            .iter()
            .cloned()
            .partition(|case| case.visibility == Visibility::Sample);
        self.grade_split(code, language, &samples, &hidden)
    }

    /// Grades pre-split sample and hidden case sets.
    pub fn grade_split(
        &self,
        code: &str,
        language: Language,
        samples: &[TestCase],
        hidden: &[TestCase],
    ) -> GradeReport {
        let sample_outcomes = self.executor.execute(code, samples, language);
        let all_samples_passed = sample_outcomes.iter().all(|outcome| outcome.passed);

        // Hidden cases run iff every sample passed.
        let hidden_outcomes = if all_samples_passed {
            self.executor.execute(code, hidden, language)
        } else {
            tracing::debug!("Sample cases failed; skipping hidden cases");
            Vec::new()
        };

        let score = score_of(&hidden_outcomes);

        let record = SubmissionRecord {
            code: code.to_string(),
            language,
            samples: sample_outcomes.clone(),
            hidden: hidden_outcomes.clone(),
            score,
            executed_at: Utc::now(),
        };
        if let Some(store) = self.store {
            if let Err(err) = store.append(&record) {
                tracing::error!("Failed to persist submission record: {}", err);
            }
        }

        let masked = hidden_outcomes
            .into_iter()
            .map(TestOutcome::masked)
            .collect();

        GradeReport {
            score,
            passed: score == 100,
            samples: sample_outcomes,
            hidden: masked,
        }
    }
}

/// `round(100 * passed / total)`; 0 for an empty set.
fn score_of(hidden_outcomes: &[TestOutcome]) -> u32 {
    if hidden_outcomes.is_empty() {
        return 0;
    }
    let passed = hidden_outcomes.iter().filter(|o| o.passed).count();
    let ratio = passed as f64 / hidden_outcomes.len() as f64;
    (ratio * 100.0).round() as u32
}
