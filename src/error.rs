use thiserror::Error;

/// Errors raised while parsing a patch locator such as `nodes[0].parameters.url`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Patch path is empty")]
    Empty,

    #[error("Unterminated bracket in path '{path}' at offset {offset}")]
    UnterminatedBracket { path: String, offset: usize },

    #[error("Unterminated quoted key in path '{path}' at offset {offset}")]
    UnterminatedQuote { path: String, offset: usize },

    #[error("Empty segment in path '{path}' at offset {offset}")]
    EmptySegment { path: String, offset: usize },

    #[error("Unexpected character '{found}' in path '{path}' at offset {offset}")]
    UnexpectedCharacter {
        path: String,
        offset: usize,
        found: char,
    },
}

/// Errors raised when a single patch cannot be written into a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("Cannot write key '{key}' into an array at '{path}'")]
    KeyOnArray { path: String, key: String },

    #[error("Index {index} at '{path}' is too far past the end of an array of length {len}")]
    IndexTooLarge {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Errors surfaced by the analyzer boundary.
#[derive(Error, Debug, Clone)]
pub enum AnalyzerError {
    #[error("No API key has been configured")]
    MissingCredential,

    #[error("The API key was rejected: {0}")]
    CredentialRejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Analysis request timed out")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("The analyzer returned an empty response")]
    EmptyResponse,

    #[error("Failed to parse analyzer response: {0}")]
    MalformedPayload(String),
}

/// Marker that the hosting service uses when a key is unknown or was revoked.
pub const ENTITY_NOT_FOUND_MARKER: &str = "Requested entity was not found";

impl AnalyzerError {
    /// Whether this failure means the current credential can no longer be used.
    pub fn is_credential_rejected(&self) -> bool {
        match self {
            AnalyzerError::CredentialRejected(_) | AnalyzerError::MissingCredential => true,
            other => other.to_string().contains(ENTITY_NOT_FOUND_MARKER),
        }
    }

    /// The message carried by the failure, without the variant's prefix.
    /// `None` for variants that carry no message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AnalyzerError::CredentialRejected(message)
            | AnalyzerError::Network(message)
            | AnalyzerError::MalformedPayload(message)
            | AnalyzerError::Api { message, .. } => Some(message),
            AnalyzerError::MissingCredential
            | AnalyzerError::Timeout
            | AnalyzerError::EmptyResponse => None,
        }
    }
}

/// Errors returned by session transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("An analysis is already in progress")]
    AnalysisInFlight,

    #[error("An API key must be selected before analyzing")]
    CredentialRequired,
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors raised while writing the corrected document.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not write file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
