//! Pipeline variable declarations and their lazy resolution.
//!
//! A job declares every variable it may read. Each declaration is either a
//! plain name read straight from the environment, or a staged declaration
//! with separate strategies for local runs and pipeline runs. Nothing is
//! read at declaration time: a missing value only fails when it is read.

use std::collections::HashMap;

use tokio::process::Command;
use tracing::debug;

use crate::config::execution::{EnvSnapshot, ExecutionContext};
use crate::error_handler::{Result, SquawkError};

/// How a staged variable obtains its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Run a shell command through `sh -c` and use its trimmed stdout.
    Command(&'static str),
    /// Use a literal value.
    Default(&'static str),
    /// Read another environment variable.
    Env(&'static str),
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarSpec {
    Plain(&'static str),
    Staged {
        name: &'static str,
        local: Strategy,
        pipeline: Strategy,
    },
}

impl VarSpec {
    pub fn name(&self) -> &'static str {
        match self {
            VarSpec::Plain(name) => name,
            VarSpec::Staged { name, .. } => name,
        }
    }
}

/// Variables read by the squawk job.
pub fn job_variables() -> Vec<VarSpec> {
    vec![
        VarSpec::Plain("GITLAB_TOKEN"),
        VarSpec::Staged {
            name: "CI_API_V4_URL",
            local: Strategy::Default("https://gitlab.com/api/v4"),
            pipeline: Strategy::Env("CI_API_V4_URL"),
        },
        VarSpec::Staged {
            name: "CI_PROJECT_ID",
            local: Strategy::Env("GITLAB_PROJECT"),
            pipeline: Strategy::Env("CI_PROJECT_ID"),
        },
        VarSpec::Staged {
            name: "CI_COMMIT_REF_NAME",
            local: Strategy::Command("git rev-parse --abbrev-ref HEAD"),
            pipeline: Strategy::Env("CI_COMMIT_REF_NAME"),
        },
        VarSpec::Plain("CI_MERGE_REQUEST_IID"),
        VarSpec::Plain("CI_MERGE_REQUEST_APPROVED"),
    ]
}

/// Resolver over a fixed set of declarations.
#[derive(Debug, Clone)]
pub struct EnvResolver {
    ctx: ExecutionContext,
    env: EnvSnapshot,
    specs: HashMap<&'static str, VarSpec>,
}

impl EnvResolver {
    pub fn new(ctx: ExecutionContext, env: EnvSnapshot, specs: Vec<VarSpec>) -> Self {
        let specs = specs.into_iter().map(|s| (s.name(), s)).collect();
        Self { ctx, env, specs }
    }

    pub fn context(&self) -> ExecutionContext {
        self.ctx
    }

    /// Returns accessors for the requested subset of declared variables.
    ///
    /// Unknown names are rejected immediately; values are still read lazily.
    pub fn request(&self, names: &[&str]) -> Result<VarMap<'_>> {
        let mut entries = HashMap::with_capacity(names.len());
        for name in names {
            let spec = self
                .specs
                .get(*name)
                .ok_or_else(|| SquawkError::UnknownVariable(name.to_string()))?;
            entries.insert(spec.name(), spec);
        }
        Ok(VarMap {
            resolver: self,
            entries,
        })
    }

    async fn resolve(&self, spec: &VarSpec) -> Result<Option<String>> {
        match spec {
            VarSpec::Plain(name) => Ok(self.env.get(name).map(str::to_string)),
            VarSpec::Staged {
                name,
                local,
                pipeline,
            } => {
                let strategy = if self.ctx.is_pipeline { pipeline } else { local };
                debug!(variable = *name, ?strategy, "resolving staged variable");
                self.run_strategy(name, strategy).await
            }
        }
    }

    async fn run_strategy(&self, name: &str, strategy: &Strategy) -> Result<Option<String>> {
        match strategy {
            Strategy::Default(value) => Ok(Some(value.to_string())),
            Strategy::Env(key) => Ok(self.env.get(key).map(str::to_string)),
            Strategy::Command(cmd) => {
                let output = Command::new("sh")
                    .arg("-c")
                    .arg(cmd)
                    .output()
                    .await
                    .map_err(|e| SquawkError::VariableResolution {
                        name: name.to_string(),
                        reason: format!("failed to spawn `{cmd}`: {e}"),
                    })?;

                if !output.status.success() {
                    return Err(SquawkError::VariableResolution {
                        name: name.to_string(),
                        reason: format!("`{cmd}` exited with {}", output.status),
                    });
                }

                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(value).filter(|v| !v.is_empty()))
            }
        }
    }
}

/// Accessors for a requested subset of variables.
#[derive(Debug)]
pub struct VarMap<'a> {
    resolver: &'a EnvResolver,
    entries: HashMap<&'static str, &'a VarSpec>,
}

impl VarMap<'_> {
    /// Reads a required variable.
    pub async fn get(&self, name: &str) -> Result<String> {
        self.get_opt(name)
            .await?
            .ok_or_else(|| SquawkError::MissingVariable(name.to_string()))
    }

    /// Reads a variable that may legitimately be absent.
    pub async fn get_opt(&self, name: &str) -> Result<Option<String>> {
        let spec = self
            .entries
            .get(name)
            .ok_or_else(|| SquawkError::UnknownVariable(name.to_string()))?;
        self.resolver.resolve(spec).await
    }
}
