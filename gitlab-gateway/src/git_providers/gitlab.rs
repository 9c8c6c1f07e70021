//! GitLab provider (REST v4) for merge request descriptions.
//!
//! Endpoints used:
//!   * GET /projects/:id/merge_requests/:iid
//!   * GET /projects/:id/merge_requests?state=opened&source_branch=:branch
//!   * PUT /projects/:id/merge_requests/:iid

use crate::errors::GatewayResult;
use crate::git_providers::ProviderConfig;
use crate::git_providers::types::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,    // "PRIVATE-TOKEN"
}

impl GitLabClient {
    /// Constructs a GitLab client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        debug!("Creating GitLabClient with base_api={}", base_api);
        Self {
            http,
            base_api,
            token,
        }
    }

    /// Builds a client from validated configuration.
    ///
    /// The underlying HTTP client carries a stable user agent so that
    /// GitLab audit logs can identify the job.
    pub fn from_config(cfg: ProviderConfig) -> GatewayResult<Self> {
        let cfg = cfg.validated()?;
        let http = Client::builder().user_agent("squawk-job/0.1").build()?;
        Ok(Self::new(http, cfg.base_api, cfg.token))
    }

    fn merge_requests_url(&self, project: &str) -> String {
        format!(
            "{}/projects/{}/merge_requests",
            self.base_api,
            urlencoding::encode(project)
        )
    }

    /// Fetches a single merge request by IID.
    pub async fn get_merge_request(
        &self,
        project: &str,
        iid: u64,
    ) -> GatewayResult<MergeRequest> {
        let url = format!("{}/{}", self.merge_requests_url(project), iid);
        debug!("GitLab get_merge_request: {}", url);

        let resp: GitLabMr = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.into_merge_request(project))
    }

    /// Lists open merge requests whose source branch equals `source_branch`.
    pub async fn list_open_merge_requests(
        &self,
        project: &str,
        source_branch: &str,
    ) -> GatewayResult<Vec<MergeRequest>> {
        let url = self.merge_requests_url(project);
        debug!(
            "GitLab list_open_merge_requests: {} source_branch={}",
            url, source_branch
        );

        let raw: Vec<GitLabMr> = self
            .http
            .get(url)
            .query(&[("state", "opened"), ("source_branch", source_branch)])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(raw
            .into_iter()
            .map(|mr| mr.into_merge_request(project))
            .collect())
    }

    /// Replaces the description of a merge request.
    pub async fn update_description(
        &self,
        project: &str,
        iid: u64,
        description: &str,
    ) -> GatewayResult<()> {
        let url = format!("{}/{}", self.merge_requests_url(project), iid);
        debug!(
            "GitLab update_description: {} ({} bytes)",
            url,
            description.len()
        );

        let resp = self
            .http
            .put(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&GitLabMrUpdate { description })
            .send()
            .await?
            .error_for_status()?;

        let _ = resp.bytes().await;
        Ok(())
    }
}

/// GitLab MR response (subset shared by single and list endpoints).
#[derive(Debug, Deserialize)]
struct GitLabMr {
    iid: u64,
    #[serde(default)]
    description: Option<String>,
    state: String,
    web_url: String,
    source_branch: String,
}

#[derive(Debug, Serialize)]
struct GitLabMrUpdate<'a> {
    description: &'a str,
}

impl GitLabMr {
    fn into_merge_request(self, project: &str) -> MergeRequest {
        MergeRequest {
            id: MergeRequestRef {
                project: project.to_string(),
                iid: self.iid,
            },
            description: self.description,
            state: self.state,
            web_url: self.web_url,
            source_branch: self.source_branch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": 9001,
        "iid": 42,
        "project_id": 7,
        "title": "Add squawk checks",
        "description": null,
        "state": "opened",
        "web_url": "https://gitlab.example.com/group/app/-/merge_requests/42",
        "source_branch": "feature/squawk",
        "target_branch": "main",
        "updated_at": "2025-03-01T10:20:30.000Z",
        "author": { "id": 3, "username": "dev", "name": "Dev One" }
    }"#;

    #[test]
    fn parses_merge_request_payload() {
        let raw: GitLabMr = serde_json::from_str(SAMPLE).unwrap();
        let mr = raw.into_merge_request("group/app");

        assert_eq!(mr.id.project, "group/app");
        assert_eq!(mr.id.iid, 42);
        assert_eq!(mr.source_branch, "feature/squawk");
        assert_eq!(mr.state, "opened");
        assert_eq!(mr.description_text(), "");
    }

    #[test]
    fn project_path_is_url_encoded() {
        let client = GitLabClient::new(
            Client::new(),
            "https://gitlab.example.com/api/v4".into(),
            "t0ken".into(),
        );
        assert_eq!(
            client.merge_requests_url("group/app"),
            "https://gitlab.example.com/api/v4/projects/group%2Fapp/merge_requests"
        );
    }

    #[test]
    fn update_payload_only_carries_description() {
        let body = serde_json::to_value(GitLabMrUpdate { description: "x" }).unwrap();
        assert_eq!(body, serde_json::json!({ "description": "x" }));
    }
}
