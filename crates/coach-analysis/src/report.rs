//! Seam to the external natural-language report generator.
//!
//! Report generation is a collaborator outside this crate; the pipeline only
//! needs a way to hand over the finished summary and to survive the
//! generator failing. A failed or malformed report never blocks the numeric
//! summary.

use thiserror::Error;

use crate::analyzer::GameAnalysisSummary;

/// Error from the external report generator.
#[derive(Error, Debug)]
#[error("report generation failed: {0}")]
pub struct ReportError(pub String);

/// Turns a finished analysis summary into a prose report.
pub trait ReportGenerator {
    fn generate(&self, summary: &GameAnalysisSummary) -> Result<String, ReportError>;
}

/// Generator used when no external text service is wired in; always produces
/// an empty report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReport;

impl ReportGenerator for NoReport {
    fn generate(&self, _summary: &GameAnalysisSummary) -> Result<String, ReportError> {
        Ok(String::new())
    }
}
