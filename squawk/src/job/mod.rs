//! The squawk job: resolve the merge request, run checks, publish the
//! summary into the description and decide the job outcome.

pub mod driver;

use gitlab_gateway::{GatewayResult, GitLabClient, MergeRequest};

pub use driver::{
    JobInputs, JobOptions, JobReport, RESULTS_SECTION, render_results, resolve_merge_request,
    run_squawk_job,
};

/// Merge request operations the job needs from the hosting service.
///
/// Plain `async fn` so the driver stays generic without boxing; GitLab is
/// the production implementation, tests provide in-memory ones.
#[allow(async_fn_in_trait)]
pub trait MergeRequestApi {
    async fn get_merge_request(&self, project: &str, iid: u64) -> GatewayResult<MergeRequest>;

    async fn list_open_merge_requests(
        &self,
        project: &str,
        source_branch: &str,
    ) -> GatewayResult<Vec<MergeRequest>>;

    async fn update_description(
        &self,
        project: &str,
        iid: u64,
        description: &str,
    ) -> GatewayResult<()>;
}

impl MergeRequestApi for GitLabClient {
    async fn get_merge_request(&self, project: &str, iid: u64) -> GatewayResult<MergeRequest> {
        GitLabClient::get_merge_request(self, project, iid).await
    }

    async fn list_open_merge_requests(
        &self,
        project: &str,
        source_branch: &str,
    ) -> GatewayResult<Vec<MergeRequest>> {
        GitLabClient::list_open_merge_requests(self, project, source_branch).await
    }

    async fn update_description(
        &self,
        project: &str,
        iid: u64,
        description: &str,
    ) -> GatewayResult<()> {
        GitLabClient::update_description(self, project, iid, description).await
    }
}
