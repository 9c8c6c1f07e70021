use gitlab_gateway::{MergeRequest, MergeRequestRef};
use tracing::{debug, error, info, warn};

use crate::checks::{CheckCatalog, CheckResult, CheckRunner, RecordedResult, failed_check_names};
use crate::config::VarMap;
use crate::error_handler::{Result, SquawkError};
use crate::job::MergeRequestApi;
use crate::log_section::LogSection;
use crate::markdown::{extract_section, patch_section, render_table};

/// Title of the description section holding the results table.
pub const RESULTS_SECTION: &str = "squawk-check-results";

const RESULT_COLUMNS: &[&str] = &["name", "status"];

/// Pipeline facts the job needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInputs {
    pub project: String,
    pub branch: String,
    /// Known when the pipeline was started by a merge request event.
    pub merge_request_iid: Option<u64>,
    /// `None` when the pipeline carries no approval information.
    pub approved: Option<bool>,
}

impl JobInputs {
    /// Variables read by [`JobInputs::from_vars`].
    pub const VARIABLES: &'static [&'static str] = &[
        "CI_PROJECT_ID",
        "CI_COMMIT_REF_NAME",
        "CI_MERGE_REQUEST_IID",
        "CI_MERGE_REQUEST_APPROVED",
    ];

    pub async fn from_vars(vars: &VarMap<'_>) -> Result<Self> {
        let project = vars.get("CI_PROJECT_ID").await?;
        let branch = vars.get("CI_COMMIT_REF_NAME").await?;

        let merge_request_iid = match vars.get_opt("CI_MERGE_REQUEST_IID").await? {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                SquawkError::VariableResolution {
                    name: "CI_MERGE_REQUEST_IID".into(),
                    reason: format!("{raw:?} is not an IID: {e}"),
                }
            })?),
            None => None,
        };

        let approved = vars
            .get_opt("CI_MERGE_REQUEST_APPROVED")
            .await?
            .map(|v| v.trim().eq_ignore_ascii_case("true"));

        Ok(Self {
            project,
            branch,
            merge_request_iid,
            approved,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JobOptions {
    /// Render and log the summary without writing the description.
    pub dry_run: bool,
}

/// What a job run produced.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub merge_request: MergeRequestRef,
    pub table: String,
    pub published: bool,
    /// Non-ignorable checks that did not pass.
    pub failed: Vec<String>,
}

impl JobReport {
    /// Turns the report into the job outcome.
    pub fn into_result(self) -> Result<Self> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(SquawkError::ChecksFailed { names: self.failed })
        }
    }
}

/// Finds the merge request the job reports on.
///
/// Uses the IID when the pipeline provides one, otherwise the single open
/// merge request whose source branch is `inputs.branch`.
pub async fn resolve_merge_request<A: MergeRequestApi>(
    api: &A,
    inputs: &JobInputs,
) -> Result<MergeRequest> {
    if let Some(iid) = inputs.merge_request_iid {
        debug!(iid, "merge request IID provided by pipeline");
        return Ok(api.get_merge_request(&inputs.project, iid).await?);
    }

    let mut open = api
        .list_open_merge_requests(&inputs.project, &inputs.branch)
        .await?;
    match open.len() {
        0 => Err(SquawkError::NoOpenMergeRequest(inputs.branch.clone())),
        1 => Ok(open.remove(0)),
        count => Err(SquawkError::AmbiguousMergeRequest {
            branch: inputs.branch.clone(),
            count,
        }),
    }
}

/// Renders check results as the two-column summary table.
pub fn render_results(results: &[CheckResult<'_>]) -> String {
    render_table(results, RESULT_COLUMNS)
}

/// Runs the squawk job end to end.
///
/// Failing to write the description is logged and does not change the
/// outcome; the returned report lists the blocking failures and
/// [`JobReport::into_result`] turns them into the job error.
pub async fn run_squawk_job<A: MergeRequestApi>(
    api: &A,
    inputs: &JobInputs,
    catalog: &CheckCatalog,
    options: JobOptions,
) -> Result<JobReport> {
    let _job = LogSection::enter("squawk checks");
    catalog.validate()?;

    let merge_request = {
        let section = LogSection::enter("resolve merge request");
        let mr = resolve_merge_request(api, inputs).await?;
        section.note(format!("!{} {}", mr.id.iid, mr.web_url));
        mr
    };

    let description = merge_request.description_text();
    let recorded = extract_section(description, RESULTS_SECTION)
        .map(RecordedResult::parse_all)
        .unwrap_or_default();
    info!(recorded = recorded.len(), "previous results read from description");

    let results = CheckRunner::new(&recorded)
        .run_all(catalog, inputs.approved)
        .await;

    let table = render_results(&results);
    let failed = failed_check_names(&results);

    let published = if options.dry_run {
        info!("dry run, description left unchanged:\n{table}");
        false
    } else {
        let _section = LogSection::enter("update merge request description");
        let updated = patch_section(description, RESULTS_SECTION, &table);
        match api
            .update_description(&merge_request.id.project, merge_request.id.iid, &updated)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                let err = SquawkError::DescriptionUpdate(e);
                error!(error = %err, "summary not published");
                false
            }
        }
    };

    if failed.is_empty() {
        info!(checks = results.len(), "all required checks passed");
    } else {
        warn!(failed = %failed.join(", "), "required checks failed");
    }

    Ok(JobReport {
        merge_request: merge_request.id.clone(),
        table,
        published,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvResolver, EnvSnapshot, ExecutionContext, job_variables};

    const BASE: &[(&str, &str)] = &[
        ("CI_PROJECT_ID", "group/app"),
        ("CI_COMMIT_REF_NAME", "feature/squawk"),
    ];

    fn pipeline_env(extra: &[(&str, &str)]) -> EnvResolver {
        let env = EnvSnapshot::from_pairs(BASE.iter().chain(extra).copied());
        EnvResolver::new(ExecutionContext::pipeline(), env, job_variables())
    }

    async fn inputs_from(resolver: &EnvResolver) -> Result<JobInputs> {
        let vars = resolver.request(JobInputs::VARIABLES)?;
        JobInputs::from_vars(&vars).await
    }

    #[tokio::test]
    async fn reads_pipeline_facts() {
        let resolver = pipeline_env(&[("CI_MERGE_REQUEST_IID", " 42 ")]);
        let inputs = inputs_from(&resolver).await.unwrap();

        assert_eq!(inputs.project, "group/app");
        assert_eq!(inputs.branch, "feature/squawk");
        assert_eq!(inputs.merge_request_iid, Some(42));
        assert_eq!(inputs.approved, None);
    }

    #[tokio::test]
    async fn approval_flag_is_case_and_whitespace_insensitive() {
        let approved = inputs_from(&pipeline_env(&[("CI_MERGE_REQUEST_APPROVED", "TRUE ")]))
            .await
            .unwrap();
        assert_eq!(approved.approved, Some(true));

        let pending = inputs_from(&pipeline_env(&[("CI_MERGE_REQUEST_APPROVED", "false")]))
            .await
            .unwrap();
        assert_eq!(pending.approved, Some(false));
    }

    #[tokio::test]
    async fn non_numeric_iid_is_a_resolution_error() {
        let err = inputs_from(&pipeline_env(&[("CI_MERGE_REQUEST_IID", "abc")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SquawkError::VariableResolution { ref name, .. } if name == "CI_MERGE_REQUEST_IID"
        ));
    }

    #[tokio::test]
    async fn missing_project_is_reported_by_name() {
        let env = EnvSnapshot::from_pairs([("CI_COMMIT_REF_NAME", "feature/squawk")]);
        let resolver = EnvResolver::new(ExecutionContext::pipeline(), env, job_variables());

        let err = inputs_from(&resolver).await.unwrap_err();
        assert!(matches!(err, SquawkError::MissingVariable(ref name) if name == "CI_PROJECT_ID"));
    }
}
