//! Data model for merge requests as seen by the CI jobs.

use serde::{Deserialize, Serialize};

/// A unique reference to a merge request.
///
/// * `project` – numeric ID or "group/project".
/// * `iid`     – merge request IID inside the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestRef {
    pub project: String,
    pub iid: u64,
}

/// Merge request metadata needed by the jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: MergeRequestRef,
    /// Free-form markdown body. GitLab returns `null` for empty descriptions.
    pub description: Option<String>,
    pub state: String,
    pub web_url: String,
    pub source_branch: String,
}

impl MergeRequest {
    /// Description text, empty when GitLab has none.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}
