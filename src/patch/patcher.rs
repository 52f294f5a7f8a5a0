use super::model::Patch;
use crate::analysis::IssueRecord;
use crate::error::{PatchError, PathError};
use crate::selection::FixSelection;
use serde_json::Value;
use tracing::{debug, warn};

/// A patch that was approved but could not be written.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPatch {
    pub issue_id: String,
    pub error: PatchError,
}

/// The outcome of applying a selection of fixes.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchReport {
    /// The corrected copy of the document.
    pub document: Value,
    /// Ids of the issues whose patches were written, in application order.
    pub applied: Vec<String>,
    pub skipped: Vec<SkippedPatch>,
}

/// What a single patch would change.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPreview {
    /// The value currently at the path. `None` when the path does not exist yet.
    pub before: Option<Value>,
    pub after: Value,
}

impl PatchPreview {
    pub fn is_noop(&self) -> bool {
        self.before.as_ref() == Some(&self.after)
    }
}

/// Produces corrected documents from an original and a set of approved fixes.
pub struct DocumentPatcher;

impl DocumentPatcher {
    /// Applies every approved patch to a deep copy of `original`.
    ///
    /// Patches are written in the order the issues appear, so when two approved
    /// patches target the same path the later one wins. `original` is never
    /// modified and the result depends only on the three arguments.
    pub fn apply(original: &Value, issues: &[IssueRecord], approved: &FixSelection) -> Value {
        Self::apply_with_report(original, issues, approved).document
    }

    /// Like [`apply`](Self::apply), also reporting which patches were written or skipped.
    pub fn apply_with_report(
        original: &Value,
        issues: &[IssueRecord],
        approved: &FixSelection,
    ) -> PatchReport {
        let mut document = original.clone();
        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for issue in issues.iter().filter(|issue| approved.is_approved(&issue.id)) {
            match Self::write(&mut document, &issue.patch) {
                Ok(()) => applied.push(issue.id.clone()),
                Err(error) => {
                    warn!(issue = %issue.id, path = %issue.patch.path, %error, "Skipping fix");
                    skipped.push(SkippedPatch {
                        issue_id: issue.id.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            applied = applied.len(),
            skipped = skipped.len(),
            "Computed corrected document"
        );
        PatchReport {
            document,
            applied,
            skipped,
        }
    }

    /// Shows the value a patch would replace and the value it would write.
    pub fn preview(original: &Value, patch: &Patch) -> Result<PatchPreview, PathError> {
        let locator = patch.locator()?;
        Ok(PatchPreview {
            before: locator.get(original).cloned(),
            after: patch.new_value.clone(),
        })
    }

    fn write(document: &mut Value, patch: &Patch) -> Result<(), PatchError> {
        let locator = patch.locator()?;
        locator.set(document, patch.new_value.clone())
    }
}
