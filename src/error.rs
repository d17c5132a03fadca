//! Error types for CircleCI API operations.

use std::fmt;

use thiserror::Error;

use crate::resource::ProjectState;

/// A non-2xx response from the CircleCI API.
///
/// `message` is taken from the `{"message": ...}` body when the server sends
/// one. An empty body leaves it unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status_code: u16,
    /// Best-effort message extracted from the response body.
    pub message: Option<String>,
}

impl ApiError {
    /// Create an error carrying only a status code.
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code,
            message: None,
        }
    }

    /// Create an error with a status code and message.
    pub fn with_message(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.status_code,
            self.message.as_deref().unwrap_or_default()
        )
    }
}

impl std::error::Error for ApiError {}

/// Errors that can occur during CircleCI operations.
#[derive(Debug, Error)]
pub enum CircleCiError {
    /// Configuration is missing or incomplete.
    #[error("CircleCI configuration required: {0}")]
    ConfigMissing(String),

    /// Invalid project identifier.
    #[error("Invalid project id '{0}': expected format 'vcs_type:account:project'")]
    InvalidId(String),

    /// VCS type other than github or bitbucket.
    #[error("Value of vcs_type must be either github or bitbucket, got '{0}'")]
    InvalidVcsType(String),

    /// Desired project configuration is unusable.
    #[error("Invalid project configuration: {0}")]
    InvalidConfig(String),

    /// Project is not in the list of followed projects.
    #[error("Unable to find project {vcs_type}/{account}/{reponame}")]
    NotFound {
        vcs_type: String,
        account: String,
        reponame: String,
    },

    /// API request returned a status >= 300.
    #[error("CircleCI API error: {0}")]
    Api(ApiError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON encoding or decoding error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Reading or writing a local state file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lifecycle operation failed after it had already changed the
    /// remote project.
    ///
    /// `state` is the project as last observed: `None` if nothing is
    /// managed any more (the old project of a replacement was disabled).
    #[error("{source}")]
    Incomplete {
        state: Option<Box<ProjectState>>,
        #[source]
        source: Box<CircleCiError>,
    },

    /// An operation failed while managing a project resource.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CircleCiError>,
    },
}

impl CircleCiError {
    /// Wrap this error with a description of what was being attempted.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns true if this error (or the error it wraps) is a project lookup miss.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Context { source, .. } | Self::Incomplete { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// The API error carried by this error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Context { source, .. } | Self::Incomplete { source, .. } => source.api_error(),
            _ => None,
        }
    }
}

impl From<ApiError> for CircleCiError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

/// Result type alias for CircleCI operations.
pub type Result<T> = core::result::Result<T, CircleCiError>;
