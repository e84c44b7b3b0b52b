//! Error handling module

use std::path::PathBuf;
use thiserror::Error;

use crate::finder::FinderError;
use crate::id::IdError;

/// Result type alias for operations that can fail with `AccTestError`
pub type Result<T> = std::result::Result<T, AccTestError>;

/// Error type for the acceptance harness.
///
/// Covers state extraction, Terraform command failures, and the failures
/// raised by check functions while a test case runs.
#[derive(Error, Debug)]
pub enum AccTestError {
    /// File system operation errors with detailed context
    #[error("File system error during {operation} on path '{path}': {source}")]
    FileSystem {
        /// The operation that failed (e.g., "write", "create directory")
        operation: String,
        /// The file path involved in the operation
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing and serialization errors with context
    #[error("JSON parsing error in {context}: {source}")]
    JsonParsing {
        /// Context where the JSON error occurred
        context: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors, e.g. a missing environment variable
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message about the configuration issue
        message: String,
    },

    /// A resource identifier could not be parsed
    #[error("error parsing Transfer Access ID: {0}")]
    Identifier(#[from] IdError),

    /// The remote lookup failed
    #[error(transparent)]
    Finder(#[from] FinderError),

    #[error("Error performing terraform command `{command}`: {message}")]
    TerraformCommandError { command: String, message: String },

    #[error("Failed to parse terraform state: {message}. Terraform output: {terraform_state}")]
    TerraformStateParseError {
        message: String,
        terraform_state: String,
    },

    /// A check function rejected the state
    #[error("Check failed: {message}")]
    CheckFailed {
        /// Detailed error message
        message: String,
    },

    /// A composed check failed at a given position
    #[error("Check {index}/{total} error: {source}")]
    ComposedCheck {
        index: usize,
        total: usize,
        #[source]
        source: Box<AccTestError>,
    },

    /// Imported state differs from the applied state
    #[error("ImportStateVerify attributes not equivalent for {resource}:\n{diff}")]
    ImportVerify {
        /// Resource address
        resource: String,
        /// Human readable attribute diff
        diff: String,
    },

    /// Destroy verification found a leftover resource
    #[error("Transfer Access {id} still exists")]
    StillExists { id: String },

    /// A precondition for running acceptance tests is not met
    #[error("Pre-check failed: {message}")]
    PreCheck { message: String },

    /// The test case was skipped
    #[error("Test skipped: {reason}")]
    Skipped { reason: String },

    /// A test step failed
    #[error("Step {step} error: {source}")]
    Step {
        step: usize,
        #[source]
        source: Box<AccTestError>,
    },
}

impl AccTestError {
    /// Create a file system error with operation context
    pub(crate) fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParsing {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a check failure
    pub fn check_failed(message: impl Into<String>) -> Self {
        Self::CheckFailed {
            message: message.into(),
        }
    }

    pub(crate) fn terraform_command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TerraformCommandError {
            command: command.into(),
            message: message.into(),
        }
    }

    pub(crate) fn terraform_state_parse(
        message: impl Into<String>,
        terraform_state: impl Into<String>,
    ) -> Self {
        Self::TerraformStateParseError {
            message: message.into(),
            terraform_state: terraform_state.into(),
        }
    }

    pub(crate) fn pre_check(message: impl Into<String>) -> Self {
        Self::PreCheck {
            message: message.into(),
        }
    }

    /// Create a skip marker
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub(crate) fn step(step: usize, source: Self) -> Self {
        Self::Step {
            step,
            source: Box::new(source),
        }
    }

    /// Returns true if this error (or the step error it wraps) is a skip.
    pub fn is_skip(&self) -> bool {
        match self {
            Self::Skipped { .. } => true,
            Self::Step { source, .. } | Self::ComposedCheck { source, .. } => source.is_skip(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for AccTestError {
    fn from(error: std::io::Error) -> Self {
        Self::FileSystem {
            operation: "unknown operation".to_string(),
            path: PathBuf::from("unknown path"),
            source: error,
        }
    }
}

impl From<serde_json::Error> for AccTestError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonParsing {
            context: "unknown context".to_string(),
            source: error,
        }
    }
}
