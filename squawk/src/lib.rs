//! Squawk: approval checks for GitLab merge requests.
//!
//! A job run goes through these stages:
//!
//! 1) **Configuration**
//!    - Decide whether we run in a pipeline or locally and what triggered it
//!    - Declare the variables the job reads; values are resolved lazily
//!
//! 2) **Merge request**
//!    - Use the pipeline IID, or the single open MR for the current branch
//!    - Read answers recorded in the `squawk-check-results` section
//!
//! 3) **Checks**
//!    - Pre-approval checks always, post-approval checks once approved
//!    - Scripts run one after another; input checks read recorded answers
//!
//! 4) **Summary**
//!    - Render a results table and patch it into the MR description
//!    - Fail when any check that cannot be ignored did not pass

pub mod checks;
pub mod config;
pub mod error_handler;
pub mod job;
pub mod log_section;
pub mod markdown;
pub mod telemetry;

pub use error_handler::{CheckExecutionError, Result, SquawkError};
