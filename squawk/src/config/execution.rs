//! Execution context and pipeline trigger selection.
//!
//! The context is decided once at startup and passed explicitly to the
//! variable resolver, so both code paths can be exercised in tests without
//! touching the process environment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error_handler::{Result, SquawkError};

/// Snapshot of environment variables backing the resolver.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Builds a snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-empty value of `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Whether the job runs inside a CI pipeline or on a developer machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    pub is_pipeline: bool,
}

impl ExecutionContext {
    pub fn pipeline() -> Self {
        Self { is_pipeline: true }
    }

    pub fn local() -> Self {
        Self { is_pipeline: false }
    }

    /// GitLab runners always export `CI=true`.
    pub fn detect(env: &EnvSnapshot) -> Self {
        let is_pipeline = env
            .get("CI")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self { is_pipeline }
    }
}

/// The pipeline event that started the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineTrigger {
    MergeRequestEvent,
    Push,
    Local,
}

impl PipelineTrigger {
    /// Value as GitLab reports it in `CI_PIPELINE_SOURCE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineTrigger::MergeRequestEvent => "merge_request_event",
            PipelineTrigger::Push => "push",
            PipelineTrigger::Local => "local",
        }
    }

    /// Execution context implied by the trigger.
    pub fn context(&self) -> ExecutionContext {
        match self {
            PipelineTrigger::Local => ExecutionContext::local(),
            _ => ExecutionContext::pipeline(),
        }
    }

    /// Resolves the trigger and checks it against the ones a job accepts.
    ///
    /// Precedence: explicit override, then `CI_PIPELINE_SOURCE` inside a
    /// pipeline, then `Local`. `Local` is always accepted.
    pub fn resolve(
        env: &EnvSnapshot,
        explicit: Option<PipelineTrigger>,
        allowed: &[PipelineTrigger],
    ) -> Result<Self> {
        let trigger = match explicit {
            Some(t) => t,
            None if ExecutionContext::detect(env).is_pipeline => {
                let source = env.get("CI_PIPELINE_SOURCE").unwrap_or_default();
                source.parse().map_err(|_| unsupported(source, allowed))?
            }
            None => PipelineTrigger::Local,
        };

        if trigger != PipelineTrigger::Local && !allowed.contains(&trigger) {
            return Err(unsupported(trigger.as_str(), allowed));
        }

        debug!(trigger = trigger.as_str(), "pipeline trigger resolved");
        Ok(trigger)
    }
}

fn unsupported(found: &str, allowed: &[PipelineTrigger]) -> SquawkError {
    SquawkError::UnsupportedTrigger {
        found: found.to_string(),
        expected: allowed
            .iter()
            .map(PipelineTrigger::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

impl fmt::Display for PipelineTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineTrigger {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "merge_request_event" => Ok(PipelineTrigger::MergeRequestEvent),
            "push" => Ok(PipelineTrigger::Push),
            "local" => Ok(PipelineTrigger::Local),
            other => Err(format!("unknown pipeline trigger: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[PipelineTrigger] =
        &[PipelineTrigger::MergeRequestEvent, PipelineTrigger::Push];

    #[test]
    fn detects_pipeline_from_ci_flag() {
        assert!(ExecutionContext::detect(&EnvSnapshot::from_pairs([("CI", "true")])).is_pipeline);
        assert!(!ExecutionContext::detect(&EnvSnapshot::default()).is_pipeline);
    }

    #[test]
    fn parses_cli_and_gitlab_spellings() {
        assert_eq!(
            "merge-request-event".parse::<PipelineTrigger>().unwrap(),
            PipelineTrigger::MergeRequestEvent
        );
        assert_eq!(
            "merge_request_event".parse::<PipelineTrigger>().unwrap(),
            PipelineTrigger::MergeRequestEvent
        );
        assert!("schedule".parse::<PipelineTrigger>().is_err());
    }

    #[test]
    fn resolves_local_outside_ci() {
        let trigger = PipelineTrigger::resolve(&EnvSnapshot::default(), None, ALLOWED).unwrap();
        assert_eq!(trigger, PipelineTrigger::Local);
        assert!(!trigger.context().is_pipeline);
    }

    #[test]
    fn resolves_pipeline_source_inside_ci() {
        let env = EnvSnapshot::from_pairs([("CI", "true"), ("CI_PIPELINE_SOURCE", "push")]);
        let trigger = PipelineTrigger::resolve(&env, None, ALLOWED).unwrap();
        assert_eq!(trigger, PipelineTrigger::Push);
    }

    #[test]
    fn explicit_trigger_decides_context_regardless_of_ci() {
        let push = PipelineTrigger::resolve(
            &EnvSnapshot::default(),
            Some(PipelineTrigger::Push),
            ALLOWED,
        )
        .unwrap();
        assert!(push.context().is_pipeline);

        let env = EnvSnapshot::from_pairs([("CI", "true"), ("CI_PIPELINE_SOURCE", "push")]);
        let local = PipelineTrigger::resolve(&env, Some(PipelineTrigger::Local), ALLOWED).unwrap();
        assert!(!local.context().is_pipeline);
    }

    #[test]
    fn rejects_trigger_the_job_does_not_accept() {
        let env = EnvSnapshot::from_pairs([("CI", "true"), ("CI_PIPELINE_SOURCE", "schedule")]);
        let err = PipelineTrigger::resolve(&env, None, ALLOWED).unwrap_err();
        assert!(matches!(err, SquawkError::UnsupportedTrigger { .. }));

        let err = PipelineTrigger::resolve(
            &EnvSnapshot::default(),
            Some(PipelineTrigger::Push),
            &[PipelineTrigger::MergeRequestEvent],
        )
        .unwrap_err();
        assert!(err.to_string().contains("merge_request_event"));
    }
}
