//! GitLab provider facade.
//!
//! Only GitLab is supported: the jobs run inside GitLab pipelines and
//! write their summary back into the merge request that triggered them.

pub mod gitlab;
pub mod types;

use crate::errors::{GatewayConfigError, GatewayResult};
use tracing::debug;

/// Runtime configuration for the GitLab client.
///
/// Usually populated from pipeline variables (`CI_API_V4_URL`, token).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base, e.g. "https://gitlab.com/api/v4".
    pub base_api: String,
    /// Access token sent as `PRIVATE-TOKEN`.
    pub token: String,
}

impl ProviderConfig {
    /// Validates the configuration and normalises the base URL.
    pub fn validated(self) -> GatewayResult<Self> {
        if self.token.trim().is_empty() {
            return Err(GatewayConfigError::MissingToken.into());
        }

        let base_api = self.base_api.trim().trim_end_matches('/').to_string();
        if !(base_api.starts_with("http://") || base_api.starts_with("https://")) {
            return Err(GatewayConfigError::InvalidBaseUrl(self.base_api).into());
        }

        debug!(base_api = %base_api, "provider config validated");
        Ok(Self {
            base_api,
            token: self.token,
        })
    }
}
