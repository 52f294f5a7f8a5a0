//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the shinsa crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use shinsa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let workflow: serde_json::Value = serde_json::from_str(r#"{"nodes": []}"#)?;
//! let analysis = AnalysisResult::from_file("path/to/analysis.json")?;
//!
//! let mut approved = FixSelection::new();
//! approved.approve_all(&analysis.errors);
//!
//! let corrected = DocumentPatcher::apply(&workflow, &analysis.errors, &approved);
//! println!("{}", to_pretty_json(&corrected)?);
//! # Ok(())
//! # }
//! ```

// Review state
pub use crate::selection::FixSelection;
pub use crate::session::{
    AnalysisTicket, Completion, CredentialSource, Session, Stage, StaticCredential,
};

// Analysis model and analyzers
pub use crate::analysis::{
    AnalysisResult, Analyzer, GeminiAnalyzer, GeminiConfig, IntoAnalysis, IssueRecord,
    NodeBreakdown, Severity, WorkflowSummary,
};

// Patching
pub use crate::patch::{DocumentPatcher, Patch, PatchPath, PatchPreview, PatchReport, PathSegment};

// Output
pub use crate::export::{DEFAULT_FILE_NAME, to_pretty_json};
pub use crate::report::ReportFormatter;

// Configuration
pub use crate::config::Config;

// Error types
pub use crate::error::{AnalyzerError, PatchError, PathError, SessionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
