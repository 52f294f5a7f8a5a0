//! # Shinsa - Workflow Review and Fix Engine
//!
//! **Shinsa** sends an automation workflow (n8n, Zapier, Make, ...) to an AI
//! analyzer, presents the structured review it returns (summary, step-by-step
//! breakdown, detected issues) and lets the user pick which of the proposed
//! fixes to apply to a corrected copy of the workflow.
//!
//! ## Core Workflow
//!
//! 1.  **Start a Session**: A `Session` owns the document, the latest analysis and the user's choices.
//! 2.  **Analyze**: `Session::analyze` parses the input, calls an `Analyzer` (Gemini by default)
//!     and moves the session from `Input` through `Analyzing` to `Results`.
//! 3.  **Select Fixes**: Toggle individual fixes or approve every fix that needs no user input.
//! 4.  **Export**: `Session::corrected_document` applies the approved patches to a deep copy of
//!     the original, and `Session::export` writes it as pretty-printed JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shinsa::prelude::*;
//! use std::path::Path;
//!
//! # async fn run() -> Result<()> {
//! let workflow = std::fs::read_to_string("workflow.json")?;
//! let analyzer = GeminiAnalyzer::new(GeminiConfig::new("my-api-key"))?;
//!
//! let mut session = Session::new(true);
//! session.analyze(&workflow, &analyzer).await?;
//!
//! if let Some(result) = session.result() {
//!     println!("{} issues found", result.errors.len());
//! }
//! session.approve_all_fixes();
//! session.export(Path::new("."), None)?;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod patch;
pub mod prelude;
pub mod report;
pub mod selection;
pub mod session;
