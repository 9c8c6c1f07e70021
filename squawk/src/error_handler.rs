//! Unified error handling for `squawk`.
//!
//! A single top-level error type [`SquawkError`] covers the fatal cases of a
//! job run. Script failures are not part of it: they are captured as
//! [`CheckExecutionError`] inside a check result and never abort the run.

use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, SquawkError>;

/// Top-level error for the `squawk` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SquawkError {
    /// A required variable was absent when it was read.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// A variable was requested that the job never declared.
    #[error("variable {0} is not declared for this job")]
    UnknownVariable(String),

    /// A retrieval strategy ran but could not produce a value.
    #[error("could not resolve {name}: {reason}")]
    VariableResolution { name: String, reason: String },

    /// A declared check is unusable (empty name, duplicate, empty script).
    #[error("malformed check {name:?}: {reason}")]
    MalformedCheck { name: String, reason: String },

    /// The pipeline trigger is not one the job accepts.
    #[error("unsupported pipeline trigger {found:?}, expected one of: {expected}")]
    UnsupportedTrigger { found: String, expected: String },

    /// No open merge request exists for the current branch.
    #[error("no open merge request for branch {0}")]
    NoOpenMergeRequest(String),

    /// More than one open merge request shares the current branch.
    #[error("{count} open merge requests for branch {branch}, expected exactly one")]
    AmbiguousMergeRequest { branch: String, count: usize },

    /// Writing the patched description back failed.
    #[error("failed to update merge request description: {0}")]
    DescriptionUpdate(#[source] gitlab_gateway::GatewayError),

    /// GitLab API failure while reading state.
    #[error(transparent)]
    Provider(#[from] gitlab_gateway::GatewayError),

    /// Aggregate job failure: non-ignorable checks did not pass.
    #[error("checks failed: {}", names.join(", "))]
    ChecksFailed { names: Vec<String> },
}

/// Failure of a script-based check.
///
/// Recorded on the check result and rendered into the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CheckExecutionError {
    pub message: String,
}

impl CheckExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
