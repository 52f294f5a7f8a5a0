use crate::analysis::{AnalysisResult, Analyzer};
use crate::error::{AnalyzerError, ExportError, SessionError};
use crate::export;
use crate::patch::{DocumentPatcher, PatchReport};
use crate::selection::FixSelection;
use ahash::AHashSet;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod credential;

pub use credential::*;

/// Shown when the analyzer rejected the key.
pub const CREDENTIAL_REJECTED_MESSAGE: &str =
    "The API key is invalid or was revoked. Please select a key again.";

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred during analysis.";

/// The stage of the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Waiting for a workflow document.
    Input,
    /// One analysis request is outstanding.
    Analyzing,
    /// An analysis result is available for review.
    Results,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Input => write!(f, "input"),
            Stage::Analyzing => write!(f, "analyzing"),
            Stage::Results => write!(f, "results"),
        }
    }
}

/// Issued when an analysis starts; must be handed back to [`Session::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    generation: u64,
    workflow_json: String,
}

impl AnalysisTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The document as it should be sent to the analyzer.
    pub fn workflow_json(&self) -> &str {
        &self.workflow_json
    }
}

/// What happened to an analyzer outcome handed to [`Session::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was committed and the session moved to this stage.
    Committed(Stage),
    /// The outcome belonged to a superseded request and was discarded.
    Stale,
}

/// Owns all review state for one user and drives the stage transitions.
///
/// `Input --submit--> Analyzing --complete(Ok)--> Results`, with
/// `Analyzing --complete(Err)--> Input` and `new_analysis` returning to `Input`.
/// Every request carries a generation number; outcomes for anything but the
/// latest request are discarded.
#[derive(Debug, Clone)]
pub struct Session {
    stage: Stage,
    raw_input: String,
    document: Option<Value>,
    result: Option<AnalysisResult>,
    error: Option<String>,
    approved: FixSelection,
    expanded: AHashSet<String>,
    credential_present: bool,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Session {
    pub fn new(credential_present: bool) -> Self {
        Self {
            stage: Stage::Input,
            raw_input: String::new(),
            document: None,
            result: None,
            error: None,
            approved: FixSelection::new(),
            expanded: AHashSet::new(),
            credential_present,
            generation: 0,
        }
    }

    /// Creates a session whose credential flag mirrors `source`.
    pub fn with_credentials(source: &dyn CredentialSource) -> Self {
        Self::new(source.has_credential())
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The text most recently submitted, kept for correction after an input error.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn approved(&self) -> &FixSelection {
        &self.approved
    }

    /// Forgets the recorded error once it has been shown.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn credential_present(&self) -> bool {
        self.credential_present
    }

    pub fn set_credential_present(&mut self, present: bool) {
        self.credential_present = present;
    }

    /// Starts an analysis of `text`.
    ///
    /// Fails without changing stage if no credential is present or a request is
    /// already outstanding. If `text` is not JSON the session drops any previous
    /// review, returns to `Input`, records the error and keeps the text.
    /// Otherwise all previous results are cleared and a ticket for the analyzer
    /// call is returned.
    pub fn submit(&mut self, text: &str) -> Result<AnalysisTicket, SessionError> {
        if !self.credential_present {
            return Err(SessionError::CredentialRequired);
        }
        if self.stage == Stage::Analyzing {
            return Err(SessionError::AnalysisInFlight);
        }

        self.raw_input = text.to_string();
        let document: Value = match serde_json::from_str(text) {
            Ok(document) => document,
            Err(e) => {
                let error = SessionError::InvalidJson(e.to_string());
                debug!(%error, "Rejected submission");
                self.clear_review_state();
                self.stage = Stage::Input;
                self.error = Some(error.to_string());
                return Err(error);
            }
        };

        let workflow_json = document.to_string();
        self.clear_review_state();
        self.document = Some(document);
        self.generation += 1;
        self.stage = Stage::Analyzing;
        debug!(generation = self.generation, "Analysis started");

        Ok(AnalysisTicket {
            generation: self.generation,
            workflow_json,
        })
    }

    /// Commits the analyzer's outcome for `ticket`, unless it has been superseded.
    pub fn complete(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<AnalysisResult, AnalyzerError>,
    ) -> Completion {
        if self.stage != Stage::Analyzing || ticket.generation != self.generation {
            warn!(
                ticket = ticket.generation,
                current = self.generation,
                stage = %self.stage,
                "Discarding stale analysis outcome"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => {
                debug!(issues = result.errors.len(), "Analysis succeeded");
                self.result = Some(result);
                self.error = None;
                self.approved.reset();
                self.stage = Stage::Results;
            }
            Err(error) => {
                warn!(%error, "Analysis failed");
                let message = if error.is_credential_rejected() {
                    self.credential_present = false;
                    CREDENTIAL_REJECTED_MESSAGE.to_string()
                } else {
                    match error.detail() {
                        Some(detail) if detail.trim().is_empty() => {
                            GENERIC_FAILURE_MESSAGE.to_string()
                        }
                        _ => error.to_string(),
                    }
                };
                self.error = Some(message);
                self.document = None;
                self.stage = Stage::Input;
            }
        }
        Completion::Committed(self.stage)
    }

    /// Runs a full submit, analyze, complete cycle against `analyzer`.
    pub async fn analyze<A>(&mut self, text: &str, analyzer: &A) -> Result<Completion, SessionError>
    where
        A: Analyzer + ?Sized,
    {
        let ticket = self.submit(text)?;
        let outcome = analyzer.analyze(ticket.workflow_json()).await;
        Ok(self.complete(ticket, outcome))
    }

    /// Returns to `Input`, dropping the document, result, selection and expansion state.
    ///
    /// Any outstanding request is orphaned: its outcome will be reported as stale.
    /// The credential flag is left as it is.
    pub fn new_analysis(&mut self) {
        self.clear_review_state();
        self.generation += 1;
        self.stage = Stage::Input;
        debug!(generation = self.generation, "Returned to input");
    }

    fn clear_review_state(&mut self) {
        self.document = None;
        self.result = None;
        self.error = None;
        self.approved.reset();
        self.expanded.clear();
    }

    /// Flips approval of one fix.
    pub fn toggle_fix(&mut self, id: &str) {
        self.approved.toggle(id);
    }

    /// Approves every fix that needs no user input. No-op without a result.
    pub fn approve_all_fixes(&mut self) {
        if let Some(result) = &self.result {
            self.approved.approve_all(&result.errors);
        }
    }

    /// Expands or collapses a section (e.g. a node breakdown) in the review.
    pub fn toggle_section(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn is_section_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// The original document with every approved fix applied.
    /// `None` until both a document and a result are available.
    pub fn corrected_document(&self) -> Option<Value> {
        self.patch_report().map(|report| report.document)
    }

    pub fn patch_report(&self) -> Option<PatchReport> {
        let document = self.document.as_ref()?;
        let result = self.result.as_ref()?;
        Some(DocumentPatcher::apply_with_report(
            document,
            &result.errors,
            &self.approved,
        ))
    }

    /// Writes the corrected document into `dir`. Returns `None` when there is nothing to export.
    pub fn export(
        &self,
        dir: &Path,
        file_name: Option<&str>,
    ) -> Result<Option<PathBuf>, ExportError> {
        let Some(document) = self.corrected_document() else {
            return Ok(None);
        };
        let name = file_name.unwrap_or(export::DEFAULT_FILE_NAME);
        export::write_document(&document, &dir.join(name)).map(Some)
    }
}
