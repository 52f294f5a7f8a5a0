/// The boundary that supplies the analyzer's API key.
pub trait CredentialSource {
    /// The currently selected key, if any.
    fn api_key(&self) -> Option<&str>;

    /// Whether a usable key has been selected.
    fn has_credential(&self) -> bool {
        self.api_key().is_some_and(|key| !key.trim().is_empty())
    }

    /// Asks for a (new) key. Returns whether one is available afterwards.
    fn prompt(&mut self) -> bool;

    /// Forgets the current key, e.g. after the service rejected it.
    fn revoke(&mut self);
}

/// A key fixed at startup from configuration or the environment. Cannot prompt.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential {
    key: Option<String>,
}

impl StaticCredential {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.filter(|k| !k.trim().is_empty()),
        }
    }
}

impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn prompt(&mut self) -> bool {
        self.has_credential()
    }

    fn revoke(&mut self) {
        self.key = None;
    }
}
