//! GitLab access for CI jobs.
//!
//! Exposes a small REST v4 client able to:
//!   * fetch a merge request by IID
//!   * list open merge requests for a source branch
//!   * overwrite a merge request description

mod errors;
pub mod git_providers;

pub use errors::{GatewayConfigError, GatewayError, GatewayProviderError, GatewayResult};
pub use git_providers::gitlab::GitLabClient;
pub use git_providers::types::{MergeRequest, MergeRequestRef};
pub use git_providers::ProviderConfig;
