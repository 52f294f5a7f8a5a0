use super::model::AnalysisResult;
use crate::error::AnalyzerError;

/// A trait for analyzer payloads that can be converted into an `AnalysisResult`.
///
/// This is the extension point for plugging in analyzers other than the bundled
/// Gemini client. Decode the provider's response into your own structs, then
/// implement this trait to translate them into the canonical model.
///
/// # Example
///
/// ```rust,no_run
/// use shinsa::analysis::{AnalysisResult, IntoAnalysis, WorkflowSummary};
/// use shinsa::error::AnalyzerError;
///
/// struct LintReport {
///     headline: String,
///     findings: Vec<String>,
/// }
///
/// impl IntoAnalysis for LintReport {
///     fn into_analysis(self) -> Result<AnalysisResult, AnalyzerError> {
///         Ok(AnalysisResult {
///             is_valid: self.findings.is_empty(),
///             summary: WorkflowSummary {
///                 accomplishment: self.headline,
///                 ..WorkflowSummary::default()
///             },
///             // Map findings into `IssueRecord`s here.
///             ..AnalysisResult::default()
///         })
///     }
/// }
/// ```
pub trait IntoAnalysis {
    /// Consumes the payload and converts it into the canonical analysis model.
    fn into_analysis(self) -> Result<AnalysisResult, AnalyzerError>;
}
