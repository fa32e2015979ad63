//! The remote judge's verdict taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of one remote submission.
///
/// Maps 1:1 to the judge's numeric status codes. `InQueue` and `Processing`
/// are the only non-terminal states; everything else is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
    MemoryLimitExceeded,
    OutputLimitExceeded,
    InternalError,
    ExecFormatError,
}

impl VerdictStatus {
    /// Maps the judge's numeric status id; `None` for unknown ids.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(VerdictStatus::InQueue),
            2 => Some(VerdictStatus::Processing),
            3 => Some(VerdictStatus::Accepted),
            4 => Some(VerdictStatus::WrongAnswer),
            5 => Some(VerdictStatus::TimeLimitExceeded),
            6 => Some(VerdictStatus::CompilationError),
            7 => Some(VerdictStatus::RuntimeError),
            8 => Some(VerdictStatus::MemoryLimitExceeded),
            9 => Some(VerdictStatus::OutputLimitExceeded),
            10 => Some(VerdictStatus::InternalError),
            11 => Some(VerdictStatus::ExecFormatError),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            VerdictStatus::InQueue => 1,
            VerdictStatus::Processing => 2,
            VerdictStatus::Accepted => 3,
            VerdictStatus::WrongAnswer => 4,
            VerdictStatus::TimeLimitExceeded => 5,
            VerdictStatus::CompilationError => 6,
            VerdictStatus::RuntimeError => 7,
            VerdictStatus::MemoryLimitExceeded => 8,
            VerdictStatus::OutputLimitExceeded => 9,
            VerdictStatus::InternalError => 10,
            VerdictStatus::ExecFormatError => 11,
        }
    }

    /// Terminal states are final; polling stops once one is reached.
    pub fn is_terminal(self) -> bool {
        !matches!(self, VerdictStatus::InQueue | VerdictStatus::Processing)
    }

    /// The judge's human-readable description for this status.
    pub fn description(self) -> &'static str {
        match self {
            VerdictStatus::InQueue => "In Queue",
            VerdictStatus::Processing => "Processing",
            VerdictStatus::Accepted => "Accepted",
            VerdictStatus::WrongAnswer => "Wrong Answer",
            VerdictStatus::TimeLimitExceeded => "Time Limit Exceeded",
            VerdictStatus::CompilationError => "Compilation Error",
            VerdictStatus::RuntimeError => "Runtime Error",
            VerdictStatus::MemoryLimitExceeded => "Memory Limit Exceeded",
            VerdictStatus::OutputLimitExceeded => "Output Limit Exceeded",
            VerdictStatus::InternalError => "Internal Error",
            VerdictStatus::ExecFormatError => "Exec Format Error",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
