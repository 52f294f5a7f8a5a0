use crate::analysis::IssueRecord;
use ahash::AHashSet;
use tracing::debug;

/// The set of issue ids whose fixes the user has approved.
///
/// Mutated only through [`toggle`](Self::toggle), [`approve_all`](Self::approve_all),
/// [`reset`](Self::reset) and [`retain_known`](Self::retain_known).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixSelection {
    approved: AHashSet<String>,
}

impl FixSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the membership of `id`. Does not check that the id exists in any result.
    pub fn toggle(&mut self, id: &str) {
        if !self.approved.remove(id) {
            self.approved.insert(id.to_string());
        }
        debug!(id, approved = self.approved.contains(id), "Toggled fix");
    }

    /// Replaces the selection with every issue whose patch needs no user input.
    ///
    /// Issues requiring input are excluded even if they were approved manually before.
    pub fn approve_all(&mut self, issues: &[IssueRecord]) {
        self.approved = issues
            .iter()
            .filter(|issue| issue.is_auto_fixable())
            .map(|issue| issue.id.clone())
            .collect();
        debug!(count = self.approved.len(), "Approved all auto-fixable issues");
    }

    /// Empties the selection.
    pub fn reset(&mut self) {
        self.approved.clear();
    }

    /// Drops approved ids that are not present in `issues`.
    pub fn retain_known(&mut self, issues: &[IssueRecord]) {
        let known: AHashSet<&str> = issues.iter().map(|issue| issue.id.as_str()).collect();
        self.approved.retain(|id| known.contains(id.as_str()));
    }

    pub fn is_approved(&self, id: &str) -> bool {
        self.approved.contains(id)
    }

    pub fn len(&self) -> usize {
        self.approved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
    }

    /// Approved ids in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.approved.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FixSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            approved: iter.into_iter().map(Into::into).collect(),
        }
    }
}
