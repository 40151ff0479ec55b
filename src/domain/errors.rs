//! Domain error types
//!
//! This module defines the error hierarchy for the provider. All errors are
//! domain-specific and don't expose third-party HTTP client types.

use std::time::Duration;
use thiserror::Error;

/// Main provider error type
///
/// Every failure that reaches the plugin boundary is one of these. At the
/// boundary it is rendered as a single human-readable diagnostic.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid resource configuration supplied by the user
    #[error("Validation error: {0}")]
    Validation(String),

    /// A decoded state ID is missing a field the resource needs
    #[error("resource ID is not correctly formatted: {0}")]
    InvalidStateId(String),

    /// An import ID does not follow the documented format
    #[error("import format error: {0}")]
    ImportFormat(String),

    /// Atlas API errors
    #[error("Atlas API error: {0}")]
    Api(#[from] AtlasApiError),

    /// Waiting for an asynchronous operation failed
    #[error("{0}")]
    Poll(#[from] PollError),

    /// Resource type not served by this provider
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// An error annotated with the operation that produced it
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Wraps the error with a description of the failed operation
    pub fn context(self, context: impl Into<String>) -> Self {
        ProviderError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping context layers
    pub fn root(&self) -> &ProviderError {
        match self {
            ProviderError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the Atlas API error behind this error, if any
    pub fn api_error(&self) -> Option<&AtlasApiError> {
        match self.root() {
            ProviderError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// True when the remote object does not exist (HTTP 404 or a `*_NOT_FOUND` code)
    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(AtlasApiError::is_not_found)
    }

    /// True for failures worth retrying: 5xx, dropped connections, `UNEXPECTED_ERROR`
    pub fn is_transient(&self) -> bool {
        self.api_error().is_some_and(AtlasApiError::is_transient)
    }

    /// Returns the Atlas error code of the underlying API error
    pub fn error_code(&self) -> Option<&str> {
        self.api_error().and_then(AtlasApiError::error_code)
    }
}

/// Atlas API errors
///
/// Errors that occur when talking to the Atlas control plane. Transport
/// failures are flattened to strings so reqwest types stay out of the API.
#[derive(Debug, Clone, Error)]
pub enum AtlasApiError {
    /// Non-2xx answer from Atlas
    #[error("{method} {path}: HTTP {status} ({error_code}) {detail}")]
    Http {
        method: String,
        path: String,
        status: u16,
        error_code: String,
        detail: String,
    },

    /// Failed to reach Atlas at all
    #[error("Failed to connect to Atlas: {0}")]
    Connection(String),

    /// Answer could not be decoded
    #[error("Invalid response from Atlas: {0}")]
    InvalidResponse(String),
}

impl AtlasApiError {
    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            AtlasApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Atlas `errorCode`, when the server answered with one
    pub fn error_code(&self) -> Option<&str> {
        match self {
            AtlasApiError::Http { error_code, .. } if !error_code.is_empty() => {
                Some(error_code.as_str())
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            AtlasApiError::Http {
                status, error_code, ..
            } => *status == 404 || error_code.ends_with("_NOT_FOUND"),
            _ => false,
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            AtlasApiError::Http {
                status, error_code, ..
            } => *status >= 500 || error_code == "UNEXPECTED_ERROR",
            AtlasApiError::Connection(_) => true,
            AtlasApiError::InvalidResponse(_) => false,
        }
    }
}

/// Failures of the async-completion poller and the retry primitive
#[derive(Debug, Error)]
pub enum PollError {
    /// The operation did not reach a target state in time
    #[error(
        "timeout after {timeout:?} while waiting for state to become '{target}' (last state: '{last_status}', last error: {})",
        .last_error.as_deref().unwrap_or("none")
    )]
    Timeout {
        target: String,
        last_status: String,
        timeout: Duration,
        last_error: Option<String>,
    },

    /// The operation reported a status that is neither pending nor target
    #[error("unexpected state '{status}', wanted target '{target}'")]
    UnexpectedState { status: String, target: String },

    /// The status check failed with a non-retryable error
    #[error("{0}")]
    Fatal(Box<ProviderError>),
}

impl PollError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::Timeout { .. })
    }
}

/// An error as shown to the Terraform user
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl ProviderError {
    /// Renders the error as one diagnostic
    ///
    /// The summary is the full message; the detail adds a hint for the
    /// failures users can act on.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let detail = match self.root() {
            ProviderError::Poll(PollError::Timeout { .. }) => {
                "The operation may still complete in Atlas. Increase the resource's timeouts block and re-run to pick it up.".to_string()
            }
            ProviderError::ImportFormat(_) => {
                "Check the import ID format documented for the resource.".to_string()
            }
            ProviderError::InvalidStateId(_) => {
                "The stored ID was not written by this provider. Re-import the resource.".to_string()
            }
            ProviderError::Api(AtlasApiError::Http { status: 401, .. }) => {
                "Check the Atlas API keys or access token.".to_string()
            }
            _ => String::new(),
        };

        Diagnostic {
            summary: self.to_string(),
            detail,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ProviderError {
    fn from(err: toml::de::Error) -> Self {
        ProviderError::Configuration(format!("TOML parse error: {err}"))
    }
}
