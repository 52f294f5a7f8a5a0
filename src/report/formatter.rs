use crate::analysis::{AnalysisResult, IssueRecord, Severity};
use crate::patch::DocumentPatcher;
use crate::session::Session;
use crate::selection::FixSelection;
use itertools::Itertools;
use serde_json::Value;
use std::fmt::Write;

/// Longest rendering of a JSON value shown inline in a fix preview.
const MAX_INLINE_VALUE: usize = 120;

/// Formats analysis results into human-readable text.
pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders the whole review: summary, flow, node breakdowns and numbered issues.
    ///
    /// Node breakdowns are only detailed when `expanded` says so.
    pub fn format_result(
        result: &AnalysisResult,
        original: Option<&Value>,
        approved: &FixSelection,
        expanded: impl Fn(&str) -> bool,
    ) -> String {
        let mut out = String::new();

        let verdict = if result.is_valid {
            "VALID"
        } else {
            "NEEDS ATTENTION"
        };
        let _ = writeln!(out, "Workflow status: {}", verdict);
        let _ = writeln!(
            out,
            "Issues: {} critical, {} warning, {} info",
            result.count(Severity::Critical),
            result.count(Severity::Warning),
            result.count(Severity::Info)
        );

        let _ = writeln!(out, "\n--- Summary ---");
        let _ = writeln!(out, "What it does:  {}", result.summary.accomplishment);
        let _ = writeln!(out, "Trigger:       {}", result.summary.trigger);
        let _ = writeln!(out, "Final outcome: {}", result.summary.final_outcome);
        let _ = writeln!(out, "Analogy:       {}", result.summary.analogy);

        if !result.text_flow.is_empty() {
            let _ = writeln!(out, "\n--- Flow ---\n{}", result.text_flow);
        }

        if !result.node_breakdowns.is_empty() {
            let _ = writeln!(out, "\n--- Steps ---");
            for (i, node) in result.node_breakdowns.iter().enumerate() {
                let marker = if expanded(&node.id) { "-" } else { "+" };
                let _ = writeln!(out, "{} {}. {} ({})", marker, i + 1, node.name, node.id);
                if expanded(&node.id) {
                    let _ = writeln!(out, "    Purpose: {}", node.purpose);
                    if !node.inputs_required.is_empty() {
                        let _ = writeln!(out, "    Needs:   {}", node.inputs_required.iter().join(", "));
                    }
                    let _ = writeln!(out, "    Config:  {}", node.configuration_notes);
                    let _ = writeln!(out, "    Output:  {}", node.output);
                    let _ = writeln!(out, "    Analogy: {}", node.analogy);
                }
            }
        }

        if result.errors.is_empty() {
            let _ = writeln!(out, "\nNo issues detected.");
        } else {
            let _ = writeln!(out, "\n--- Issues ---");
            for (i, issue) in result.errors.iter().enumerate() {
                out.push_str(&Self::format_issue(i + 1, issue, original, approved));
            }
        }
        out
    }

    /// Renders the review for the session's current result, if any.
    pub fn format_session(session: &Session) -> Option<String> {
        let result = session.result()?;
        Some(Self::format_result(
            result,
            session.document(),
            session.approved(),
            |id| session.is_section_expanded(id),
        ))
    }

    /// Renders one numbered issue with its approval box and fix preview.
    pub fn format_issue(
        number: usize,
        issue: &IssueRecord,
        original: Option<&Value>,
        approved: &FixSelection,
    ) -> String {
        let mut out = String::new();
        let checkbox = match (approved.is_approved(&issue.id), issue.is_auto_fixable()) {
            (true, _) => "[x]",
            (false, true) => "[ ]",
            (false, false) => "[!]",
        };
        let _ = writeln!(
            out,
            "{} {:>2}. {} {}",
            checkbox,
            number,
            Self::severity_marker(issue.severity),
            issue.description
        );
        if let Some(node_id) = &issue.node_id {
            let _ = writeln!(out, "       Node:   {}", node_id);
        }
        let _ = writeln!(out, "       Impact: {}", issue.impact);
        let _ = writeln!(out, "       Fix:    {}", issue.recommendation);

        let after = Self::format_value(&issue.patch.new_value);
        match original.map(|doc| DocumentPatcher::preview(doc, &issue.patch)) {
            Some(Ok(preview)) => {
                let before = preview
                    .before
                    .as_ref()
                    .map_or_else(|| "(absent)".to_string(), Self::format_value);
                let _ = writeln!(out, "       Change: {}: {} -> {}", issue.patch.path, before, after);
            }
            Some(Err(e)) => {
                let _ = writeln!(out, "       Change: unusable path '{}' ({})", issue.patch.path, e);
            }
            None => {
                let _ = writeln!(out, "       Change: {} = {}", issue.patch.path, after);
            }
        }
        if !issue.is_auto_fixable() {
            let _ = writeln!(out, "       Requires your input before it can be applied.");
        }
        out
    }

    fn severity_marker(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => "[CRITICAL]",
            Severity::Warning => "[WARNING]",
            Severity::Info => "[INFO]",
        }
    }

    /// Compact single-line rendering, truncated for display.
    fn format_value(value: &Value) -> String {
        let text = value.to_string();
        if text.chars().count() > MAX_INLINE_VALUE {
            let cut: String = text.chars().take(MAX_INLINE_VALUE).collect();
            format!("{}...", cut)
        } else {
            text
        }
    }
}
