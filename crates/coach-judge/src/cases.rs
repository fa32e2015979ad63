//! Test cases and per-case outcomes.

use serde::{Deserialize, Serialize};

use crate::client::SubmissionResult;
use crate::verdict::VerdictStatus;

/// Status string for a case whose judging failed outright (network error,
/// rejected submission, poll timeout) rather than producing a verdict.
pub const EXECUTION_FAILED: &str = "Execution Failed";

/// Sentinel replacing hidden-case output before it is returned to the
/// submitter.
pub const HIDDEN_OUTPUT_SENTINEL: &str = "Hidden";

/// Whether a test case is shown to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Sample,
    Hidden,
}

/// One input/expected-output pair supplied by the question storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
    pub visibility: Visibility,
}

impl TestCase {
    pub fn sample(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
            visibility: Visibility::Sample,
        }
    }

    pub fn hidden(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
            visibility: Visibility::Hidden,
        }
    }
}

/// The graded result of running one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub input: String,
    pub output: String,
    pub expected: String,
    /// Terminal verdict description, or [`EXECUTION_FAILED`].
    pub status: String,
    /// Wall-clock time reported by the judge, as it reports it.
    pub time: Option<String>,
    /// Peak memory in kilobytes, when reported.
    pub memory: Option<u64>,
    /// stderr or compiler output, when any.
    pub diagnostic: String,
    pub passed: bool,
}

impl TestOutcome {
    /// Builds an outcome from a terminal judge result.
    ///
    /// Pass requires an `Accepted` verdict and exact equality of actual and
    /// expected output after trimming surrounding whitespace.
    pub(crate) fn from_result(case: &TestCase, result: &SubmissionResult) -> Self {
        let verdict = result.verdict();
        let output = result.stdout.as_deref().unwrap_or("").trim().to_string();
        let expected = case.expected.trim().to_string();
        let passed = verdict == Some(VerdictStatus::Accepted) && output == expected;
        let status = match verdict {
            Some(v) => v.to_string(),
            None => format!("Unknown Status ({})", result.status.id),
        };
        let diagnostic = result
            .stderr
            .clone()
            .or_else(|| result.compile_output.clone())
            .unwrap_or_default();

        Self {
            input: case.input.clone(),
            output,
            expected,
            status,
            time: result.time.clone(),
            memory: result.memory,
            diagnostic,
            passed,
        }
    }

    /// Builds the failing outcome recorded when judging a case errored.
    pub(crate) fn execution_failed(case: &TestCase, diagnostic: String) -> Self {
        Self {
            input: case.input.clone(),
            output: String::new(),
            expected: case.expected.trim().to_string(),
            status: EXECUTION_FAILED.to_string(),
            time: None,
            memory: None,
            diagnostic,
            passed: false,
        }
    }

    /// Replaces the actual output with the hidden sentinel.
    pub fn masked(self) -> Self {
        Self {
            output: HIDDEN_OUTPUT_SENTINEL.to_string(),
            ..self
        }
    }
}
