use crate::patch::Patch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a detected issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Parses a severity label case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four-part plain-language summary of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub accomplishment: String,
    pub trigger: String,
    pub final_outcome: String,
    pub analogy: String,
}

/// A descriptive record for one step of the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBreakdown {
    pub id: String,
    pub name: String,
    pub purpose: String,
    pub inputs_required: Vec<String>,
    pub configuration_notes: String,
    pub output: String,
    pub analogy: String,
}

/// One detected problem and the fix proposed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    /// Unique within one `AnalysisResult`.
    pub id: String,
    pub severity: Severity,
    pub description: String,
    pub impact: String,
    pub recommendation: String,
    /// The node this issue concerns. `None` for document-wide issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub patch: Patch,
}

impl IssueRecord {
    pub fn is_auto_fixable(&self) -> bool {
        self.patch.is_auto_fixable()
    }
}

/// The complete analysis of one workflow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_valid: bool,
    pub summary: WorkflowSummary,
    pub text_flow: String,
    pub node_breakdowns: Vec<NodeBreakdown>,
    pub errors: Vec<IssueRecord>,
}

impl AnalysisResult {
    /// Loads a previously saved analysis from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let result = serde_json::from_str(&content)?;
        Ok(result)
    }

    pub fn issue(&self, id: &str) -> Option<&IssueRecord> {
        self.errors.iter().find(|issue| issue.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&NodeBreakdown> {
        self.node_breakdowns.iter().find(|node| node.id == id)
    }

    /// Number of issues at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.errors
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    /// Issues whose fix can be applied without user input.
    pub fn auto_fixable(&self) -> impl Iterator<Item = &IssueRecord> {
        self.errors.iter().filter(|issue| issue.is_auto_fixable())
    }
}
