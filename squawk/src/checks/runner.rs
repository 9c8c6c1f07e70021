//! Sequential check execution in two phases.
//!
//! Pre-approval checks always run. Post-approval checks run only when the
//! merge request is known to be approved. Checks run one at a time in
//! declaration order; the table rendered from the results keeps that order.

use tracing::{info, warn};

use crate::checks::script::run_script;
use crate::checks::{
    Check, CheckCatalog, CheckKind, CheckResult, InputKind, RecordedResult, find_recorded,
};
use crate::log_section::LogSection;

/// Runs checks against the answers recorded by previous runs.
#[derive(Debug, Clone, Copy)]
pub struct CheckRunner<'r> {
    recorded: &'r [RecordedResult],
}

impl<'r> CheckRunner<'r> {
    pub fn new(recorded: &'r [RecordedResult]) -> Self {
        Self { recorded }
    }

    /// Runs both phases. `approved` is `None` when the pipeline exposes no
    /// approval information; the post-approval phase then is skipped.
    pub async fn run_all<'c>(
        &self,
        catalog: &'c CheckCatalog,
        approved: Option<bool>,
    ) -> Vec<CheckResult<'c>> {
        let mut results = self.run_phase("pre-approval", &catalog.pre_approval).await;

        if approved == Some(true) {
            results.extend(self.run_phase("post-approval", &catalog.post_approval).await);
        } else {
            info!(
                approval = ?approved,
                "merge request not approved, skipping post-approval checks"
            );
        }

        results
    }

    /// Runs one list of checks in order.
    pub async fn run_phase<'c>(&self, phase: &str, checks: &'c [Check]) -> Vec<CheckResult<'c>> {
        let _section = LogSection::enter(format!("{phase} checks"));
        let mut results = Vec::with_capacity(checks.len());
        for check in checks {
            results.push(self.run_check(check).await);
        }
        results
    }

    /// Evaluates a single check.
    pub async fn run_check<'c>(&self, check: &'c Check) -> CheckResult<'c> {
        let section = LogSection::enter(&check.name);

        let result = match &check.kind {
            CheckKind::Script(script) => match run_script(script).await {
                Ok(()) => CheckResult {
                    check,
                    passed: true,
                    user_input: None,
                    error: None,
                },
                Err(err) => {
                    warn!(check = %check.name, error = %err, "check script failed");
                    CheckResult {
                        check,
                        passed: false,
                        user_input: None,
                        error: Some(err),
                    }
                }
            },
            CheckKind::Input(kind) => {
                let answer = find_recorded(self.recorded, &check.name).and_then(RecordedResult::answer);
                let passed = match (kind, answer) {
                    (_, None) => false,
                    (InputKind::Boolean, Some(a)) => answer_is_affirmative(a),
                    (InputKind::Text, Some(_)) => true,
                };
                CheckResult {
                    check,
                    passed,
                    user_input: answer.map(str::to_string),
                    error: None,
                }
            }
        };

        section.note(result.status_text());
        result
    }
}

/// A boolean answer passes when it reads "true", "passed" or carries ✅.
pub fn answer_is_affirmative(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    lower.contains("true") || lower.contains("passed") || answer.contains('✅')
}

/// Names of the checks that make the job fail, in run order.
pub fn failed_check_names(results: &[CheckResult<'_>]) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.blocks())
        .map(|r| r.check.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded(name: &str, status: &str) -> RecordedResult {
        RecordedResult {
            name: name.into(),
            status: status.into(),
        }
    }

    #[test]
    fn affirmative_answers() {
        assert!(answer_is_affirmative("TRUE"));
        assert!(answer_is_affirmative("✅ Passed"));
        assert!(answer_is_affirmative("passed review"));
        assert!(answer_is_affirmative("✅"));
        assert!(!answer_is_affirmative("no"));
        assert!(!answer_is_affirmative("❌ Failed"));
    }

    #[tokio::test]
    async fn boolean_check_uses_exact_name_match() {
        let rows = vec![
            recorded("Developer has reviewed their changes", "✅ Passed"),
            recorded("Developer has reviewed", "no"),
        ];
        let check = Check::boolean("Developer has reviewed their changes");
        let result = CheckRunner::new(&rows).run_check(&check).await;

        assert!(result.passed);
        assert_eq!(result.user_input.as_deref(), Some("✅ Passed"));
    }

    #[tokio::test]
    async fn boolean_check_without_answer_fails() {
        let check = Check::boolean("QA sign-off");
        let result = CheckRunner::new(&[]).run_check(&check).await;
        assert!(!result.passed);
        assert!(result.user_input.is_none());
        assert!(result.blocks());
    }

    #[tokio::test]
    async fn text_check_passes_on_any_answer() {
        let rows = vec![recorded("Release notes", "ℹ️ Fixes login redirect")];
        let check = Check::text("Release notes");
        let result = CheckRunner::new(&rows).run_check(&check).await;
        assert!(result.passed);
        assert_eq!(result.user_input.as_deref(), Some("Fixes login redirect"));
    }

    #[tokio::test]
    async fn script_failure_is_recorded_not_raised() {
        let check = Check::script("Lint", ["sh", "-c", "echo 'lint errors' >&2; exit 1"]);
        let result = CheckRunner::new(&[]).run_check(&check).await;
        assert!(!result.passed);
        assert_eq!(result.error.unwrap().message, "lint errors");
    }

    #[tokio::test]
    async fn post_approval_phase_is_gated() {
        let catalog = CheckCatalog {
            pre_approval: vec![Check::script("Pre", ["true"])],
            post_approval: vec![Check::script("Post", ["true"])],
        };
        let runner = CheckRunner::new(&[]);

        for approval in [None, Some(false)] {
            let results = runner.run_all(&catalog, approval).await;
            let names: Vec<_> = results.iter().map(|r| r.check.name.as_str()).collect();
            assert_eq!(names, ["Pre"]);
        }

        let results = runner.run_all(&catalog, Some(true)).await;
        let names: Vec<_> = results.iter().map(|r| r.check.name.as_str()).collect();
        assert_eq!(names, ["Pre", "Post"]);
    }

    #[tokio::test]
    async fn checks_run_in_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("order.log");
        let append = |tag: &str| {
            Check::script(
                tag.to_string(),
                ["sh".to_string(), "-c".to_string(), format!("echo {tag} >> '{}'", log.display())],
            )
        };
        let checks = vec![append("one"), append("two"), append("three")];

        CheckRunner::new(&[]).run_phase("pre-approval", &checks).await;

        let written = std::fs::read_to_string(&log).unwrap();
        assert_eq!(written, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn ignorable_failures_are_excluded_from_failed_names() {
        let checks = vec![
            Check::script("Docs", ["false"]).ignorable(),
            Check::script("Lint", ["false"]),
            Check::script("Build", ["true"]),
        ];
        let results = CheckRunner::new(&[]).run_phase("pre-approval", &checks).await;

        assert_eq!(failed_check_names(&results), vec!["Lint".to_string()]);
        assert!(results[0].status_text().starts_with("⚠️ Ignored"));
    }
}
