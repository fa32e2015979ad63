//! HTTP client for the remote code-judging service.
//!
//! One submission is one round trip: POST the wrapped source and stdin, get
//! back an opaque token, then poll the token at a fixed interval until the
//! reported status turns terminal.

use std::time::Duration;

use coach_core::poll::{poll_until, PollError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cases::{TestCase, TestOutcome};
use crate::harness::Language;
use crate::verdict::VerdictStatus;

/// Interval between verdict polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Overall bound on waiting for a terminal verdict.
pub const VERDICT_DEADLINE: Duration = Duration::from_secs(10);
/// Per-request network timeout.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

/// CPU time limit sent with every submission, in seconds.
const CPU_TIME_LIMIT_SECS: u32 = 5;
/// Memory limit sent with every submission, in kilobytes (128 MB).
const MEMORY_LIMIT_KB: u32 = 128_000;

/// Errors from the remote judge client.
#[derive(Error, Debug)]
pub enum JudgeError {
    /// Required credentials were not present in the environment. Fatal at
    /// client construction.
    #[error("judge credentials missing: {0} is not set")]
    MissingCredentials(&'static str),
    /// The HTTP client could not be built.
    #[error("failed to build judge HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The judge answered a submission with a non-2xx response.
    #[error("submission rejected by judge: {0}")]
    SubmissionRejected(String),
    /// A network round trip failed. Individual poll failures are surfaced
    /// here immediately, without retry.
    #[error("judge service unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),
    /// No terminal verdict was reached within [`VERDICT_DEADLINE`].
    #[error("timed out waiting for a terminal verdict")]
    Timeout,
    /// The judge returned a payload the client cannot interpret.
    #[error("unexpected judge response: {0}")]
    Malformed(String),
}

/// Connection settings for the judge service.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Base URL of the judge API, without trailing slash.
    pub base_url: String,
    pub api_key: String,
    pub api_host: String,
}

impl JudgeConfig {
    pub const DEFAULT_API_HOST: &'static str = "judge0-ce.p.rapidapi.com";

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_host: Self::DEFAULT_API_HOST.to_string(),
        }
    }

    /// Reads `JUDGE0_API_URL` and `JUDGE0_API_KEY` from the environment.
    ///
    /// # Errors
    ///
    /// [`JudgeError::MissingCredentials`] when either variable is unset.
    pub fn from_env() -> Result<Self, JudgeError> {
        let base_url = std::env::var("JUDGE0_API_URL")
            .map_err(|_| JudgeError::MissingCredentials("JUDGE0_API_URL"))?;
        let api_key = std::env::var("JUDGE0_API_KEY")
            .map_err(|_| JudgeError::MissingCredentials("JUDGE0_API_KEY"))?;
        Ok(Self::new(base_url, api_key))
    }
}

#[derive(Debug, Serialize)]
struct SubmissionRequest<'a> {
    source_code: &'a str,
    stdin: &'a str,
    language_id: u32,
    redirect_stderr_to_stdout: bool,
    cpu_time_limit: u32,
    memory_limit: u32,
}

#[derive(Debug, Deserialize)]
struct SubmissionToken {
    token: String,
}

/// The `status` object of a poll response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusBody {
    pub id: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// One poll response from the judge, terminal or not.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionResult {
    pub status: StatusBody,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub memory: Option<u64>,
}

impl SubmissionResult {
    /// The typed verdict, when the status id is known.
    pub fn verdict(&self) -> Option<VerdictStatus> {
        VerdictStatus::from_id(self.status.id)
    }
}

/// Submits code to the remote judge and awaits graded verdicts.
pub struct JudgeClient {
    http: reqwest::blocking::Client,
    config: JudgeConfig,
}

impl JudgeClient {
    /// Builds a client with a bounded per-request network timeout.
    pub fn new(config: JudgeConfig) -> Result<Self, JudgeError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(NETWORK_TIMEOUT)
            .build()
            .map_err(JudgeError::Client)?;
        Ok(Self { http, config })
    }

    /// Builds a client from `JUDGE0_API_URL` / `JUDGE0_API_KEY`.
    pub fn from_env() -> Result<Self, JudgeError> {
        Self::new(JudgeConfig::from_env()?)
    }

    /// Submits one (already wrapped) source + stdin pair.
    ///
    /// # Errors
    ///
    /// [`JudgeError::SubmissionRejected`] on any non-2xx response, carrying
    /// the remote diagnostic; [`JudgeError::Unavailable`] on transport
    /// failure.
    pub fn submit(
        &self,
        source: &str,
        stdin: &str,
        language: Language,
    ) -> Result<String, JudgeError> {
        let body = SubmissionRequest {
            source_code: source,
            stdin,
            language_id: language.id(),
            redirect_stderr_to_stdout: true,
            cpu_time_limit: CPU_TIME_LIMIT_SECS,
            memory_limit: MEMORY_LIMIT_KB,
        };

        let response = self
            .http
            .post(format!("{}/submissions", self.config.base_url))
            .header("x-rapidapi-host", &self.config.api_host)
            .header("x-rapidapi-key", &self.config.api_key)
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            let diagnostic = response.text().unwrap_or_default();
            return Err(JudgeError::SubmissionRejected(diagnostic));
        }

        let token: SubmissionToken = response
            .json()
            .map_err(|err| JudgeError::Malformed(err.to_string()))?;
        tracing::debug!("Submission accepted, token {}", token.token);
        Ok(token.token)
    }

    /// Polls the judge until `token` reaches a terminal verdict.
    ///
    /// Polls every [`POLL_INTERVAL`] within [`VERDICT_DEADLINE`]. A failed
    /// poll round trip is surfaced immediately as
    /// [`JudgeError::Unavailable`], not retried.
    pub fn await_verdict(&self, token: &str) -> Result<SubmissionResult, JudgeError> {
        let url = format!("{}/submissions/{}", self.config.base_url, token);
        poll_until(POLL_INTERVAL, VERDICT_DEADLINE, || {
            let response = self
                .http
                .get(&url)
                .header("x-rapidapi-host", &self.config.api_host)
                .header("x-rapidapi-key", &self.config.api_key)
                .send()?;
            let result: SubmissionResult = response
                .json()
                .map_err(|err| JudgeError::Malformed(err.to_string()))?;
            match result.verdict() {
                Some(verdict) if verdict.is_terminal() => Ok(Some(result)),
                Some(_) => Ok(None),
                None => Err(JudgeError::Malformed(format!(
                    "unknown status id {}",
                    result.status.id
                ))),
            }
        })
        .map_err(|err| match err {
            PollError::Attempt(inner) => inner,
            PollError::DeadlineExceeded => JudgeError::Timeout,
        })
    }

    /// Runs every test case in input order and returns one outcome per case.
    ///
    /// The user code is wrapped in the language harness once. A failure while
    /// judging one case is converted into a failing outcome so the remaining
    /// cases still run; the returned sequence always matches the input order
    /// and length.
    pub fn execute(
        &self,
        code: &str,
        cases: &[TestCase],
        language: Language,
    ) -> Vec<TestOutcome> {
        let wrapped = language.wrap(code);
        let mut outcomes = Vec::with_capacity(cases.len());
        for case in cases {
            match self.run_case(&wrapped, case, language) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    tracing::warn!("Test case execution failed: {}", err);
                    outcomes.push(TestOutcome::execution_failed(case, err.to_string()));
                }
            }
        }
        outcomes
    }

    fn run_case(
        &self,
        wrapped_source: &str,
        case: &TestCase,
        language: Language,
    ) -> Result<TestOutcome, JudgeError> {
        let token = self.submit(wrapped_source, &case.input, language)?;
        let result = self.await_verdict(&token)?;
        Ok(TestOutcome::from_result(case, &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::EXECUTION_FAILED;

    #[test]
    fn test_execute_against_unreachable_judge_fails_every_case_in_order() {
        // Nothing listens on port 1, so every submission errors at the
        // transport; each one must still yield its own failing outcome.
        let client = JudgeClient::new(JudgeConfig::new("http://127.0.0.1:1", "key")).unwrap();
        let cases = vec![
            TestCase::sample("3\n1 2 3", "6"),
            TestCase::hidden("4\n1 2 3 4", "10"),
            TestCase::hidden("1\n9", "9"),
        ];

        let outcomes = client.execute("print(1)", &cases, Language::Python);

        assert_eq!(outcomes.len(), cases.len());
        for (case, outcome) in cases.iter().zip(&outcomes) {
            assert_eq!(outcome.input, case.input);
            assert_eq!(outcome.status, EXECUTION_FAILED);
            assert!(!outcome.passed);
            assert!(!outcome.diagnostic.is_empty());
        }
    }

    #[test]
    fn test_config_from_env_requires_both_credentials() {
        // One test owns both variables so parallel tests cannot race on them.
        std::env::remove_var("JUDGE0_API_URL");
        std::env::remove_var("JUDGE0_API_KEY");
        assert!(matches!(
            JudgeConfig::from_env(),
            Err(JudgeError::MissingCredentials("JUDGE0_API_URL"))
        ));

        std::env::set_var("JUDGE0_API_URL", "https://judge.example/api");
        assert!(matches!(
            JudgeConfig::from_env(),
            Err(JudgeError::MissingCredentials("JUDGE0_API_KEY"))
        ));

        std::env::set_var("JUDGE0_API_KEY", "secret");
        let config = JudgeConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://judge.example/api");
        assert_eq!(config.api_host, JudgeConfig::DEFAULT_API_HOST);

        std::env::remove_var("JUDGE0_API_URL");
        std::env::remove_var("JUDGE0_API_KEY");
    }

    #[test]
    fn test_submission_result_deserializes_judge_payload() {
        let json = r#"{
            "status": {"id": 3, "description": "Accepted"},
            "stdout": "6\n",
            "stderr": null,
            "compile_output": null,
            "time": "0.002",
            "memory": 1024
        }"#;
        let result: SubmissionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.verdict(), Some(VerdictStatus::Accepted));
        assert_eq!(result.stdout.as_deref(), Some("6\n"));
        assert_eq!(result.memory, Some(1024));
    }

    #[test]
    fn test_submission_result_tolerates_missing_fields() {
        let json = r#"{"status": {"id": 2}}"#;
        let result: SubmissionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.verdict(), Some(VerdictStatus::Processing));
        assert!(result.stdout.is_none());
        assert!(result.verdict().map(|v| !v.is_terminal()).unwrap_or(false));
    }

    #[test]
    fn test_submission_request_wire_format() {
        let body = SubmissionRequest {
            source_code: "print(1)",
            stdin: "3",
            language_id: 71,
            redirect_stderr_to_stdout: true,
            cpu_time_limit: CPU_TIME_LIMIT_SECS,
            memory_limit: MEMORY_LIMIT_KB,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["language_id"], 71);
        assert_eq!(json["cpu_time_limit"], 5);
        assert_eq!(json["memory_limit"], 128000);
        assert_eq!(json["redirect_stderr_to_stdout"], true);
    }
}
