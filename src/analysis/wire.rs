use super::conversion::IntoAnalysis;
use super::model::{AnalysisResult, IssueRecord, NodeBreakdown, Severity, WorkflowSummary};
use crate::error::AnalyzerError;
use crate::patch::Patch;
use ahash::AHashSet;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

// --- Wire structs ---
// These mirror the JSON the analyzer is instructed to produce and are only used
// for conversion into the canonical model.

#[derive(Debug, Deserialize)]
pub struct RawAnalysis {
    #[serde(default, alias = "isValid")]
    pub is_valid: Option<bool>,
    #[serde(default)]
    pub summary: RawSummary,
    #[serde(default, alias = "textFlow")]
    pub text_flow: String,
    #[serde(default, alias = "nodeBreakdowns")]
    pub node_breakdowns: Vec<RawNodeBreakdown>,
    #[serde(default)]
    pub errors: Vec<RawIssue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSummary {
    #[serde(default)]
    pub accomplishment: String,
    #[serde(default)]
    pub trigger: String,
    #[serde(default, alias = "finalOutcome")]
    pub final_outcome: String,
    #[serde(default)]
    pub analogy: String,
}

#[derive(Debug, Deserialize)]
pub struct RawNodeBreakdown {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default, alias = "inputsRequired")]
    pub inputs_required: Vec<String>,
    #[serde(default, alias = "configurationNotes")]
    pub configuration_notes: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub analogy: String,
}

#[derive(Debug, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default, alias = "nodeId")]
    pub node_id: Option<String>,
    #[serde(alias = "jsonModification")]
    pub json_modification: RawModification,
}

#[derive(Debug, Deserialize)]
pub struct RawModification {
    pub path: String,
    /// Transmitted as a string holding JSON; other JSON types are accepted as-is.
    #[serde(default, alias = "newValue")]
    pub new_value: Value,
    #[serde(default, alias = "requiresUserInput")]
    pub requires_user_input: bool,
}

// --- Decoding ---

/// Decodes the analyzer's text response into an `AnalysisResult`.
///
/// Optional markdown code fences around the payload are removed first. Text
/// that is not JSON, or JSON that does not match the expected shape, is a
/// `MalformedPayload` error.
pub fn decode_analysis(text: &str) -> Result<AnalysisResult, AnalyzerError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(AnalyzerError::EmptyResponse);
    }
    let raw: RawAnalysis =
        serde_json::from_str(body).map_err(|e| AnalyzerError::MalformedPayload(e.to_string()))?;
    raw.into_analysis()
}

/// Removes a surrounding ```` ``` ```` or ```` ```json ```` fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") up to the end of the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

/// Re-parses a transmitted value: strings holding JSON become that JSON,
/// anything else is kept verbatim.
pub fn reparse_value(value: Value) -> Value {
    match value {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}

impl IntoAnalysis for RawAnalysis {
    fn into_analysis(self) -> Result<AnalysisResult, AnalyzerError> {
        let mut seen = AHashSet::new();
        let errors: Vec<IssueRecord> = self
            .errors
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let id = if raw.id.trim().is_empty() {
                    format!("issue-{}", index + 1)
                } else {
                    raw.id
                };
                if !seen.insert(id.clone()) {
                    warn!(%id, "Analyzer returned a duplicate issue id");
                }
                let severity = Severity::from_label(&raw.severity).unwrap_or_else(|| {
                    warn!(%id, severity = %raw.severity, "Unknown severity, treating as info");
                    Severity::Info
                });
                IssueRecord {
                    id,
                    severity,
                    description: raw.description,
                    impact: raw.impact,
                    recommendation: raw.recommendation,
                    node_id: raw.node_id.filter(|node_id| !node_id.is_empty()),
                    patch: Patch {
                        path: raw.json_modification.path,
                        new_value: reparse_value(raw.json_modification.new_value),
                        requires_user_input: raw.json_modification.requires_user_input,
                    },
                }
            })
            .collect();

        let is_valid = self
            .is_valid
            .unwrap_or_else(|| errors.iter().all(|e| e.severity != Severity::Critical));

        let node_breakdowns = self
            .node_breakdowns
            .into_iter()
            .map(|raw| NodeBreakdown {
                id: raw.id,
                name: raw.name,
                purpose: raw.purpose,
                inputs_required: raw.inputs_required,
                configuration_notes: raw.configuration_notes,
                output: raw.output,
                analogy: raw.analogy,
            })
            .collect();

        Ok(AnalysisResult {
            is_valid,
            summary: WorkflowSummary {
                accomplishment: self.summary.accomplishment,
                trigger: self.summary.trigger,
                final_outcome: self.summary.final_outcome,
                analogy: self.summary.analogy,
            },
            text_flow: self.text_flow,
            node_breakdowns,
            errors,
        })
    }
}
