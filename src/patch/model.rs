use super::path::PatchPath;
use crate::error::PathError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single proposed modification to a workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    /// Dot/bracket locator of the value to replace, e.g. `nodes[3].parameters.url`.
    pub path: String,
    /// The value written at `path`.
    pub new_value: Value,
    /// When set, `new_value` is only a placeholder (usually for a secret) and
    /// the patch must not be applied without the user editing it first.
    #[serde(default)]
    pub requires_user_input: bool,
}

impl Patch {
    pub fn new(path: impl Into<String>, new_value: Value) -> Self {
        Self {
            path: path.into(),
            new_value,
            requires_user_input: false,
        }
    }

    /// Marks the patch as needing user-supplied data before it is meaningful.
    pub fn requiring_input(mut self) -> Self {
        self.requires_user_input = true;
        self
    }

    /// Parses `path` into a structured locator.
    pub fn locator(&self) -> Result<PatchPath, PathError> {
        PatchPath::parse(&self.path)
    }

    /// Whether this patch may be approved in bulk.
    pub fn is_auto_fixable(&self) -> bool {
        !self.requires_user_input
    }
}
