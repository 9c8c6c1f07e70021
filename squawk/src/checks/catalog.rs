//! The static list of squawk checks.

use std::collections::HashSet;

use crate::checks::{Check, CheckKind};
use crate::error_handler::{Result, SquawkError};

/// Checks grouped by phase, each list in execution order.
#[derive(Debug, Clone, Default)]
pub struct CheckCatalog {
    pub pre_approval: Vec<Check>,
    pub post_approval: Vec<Check>,
}

impl CheckCatalog {
    /// Rejects empty names, repeated names and scripts without a command.
    ///
    /// Names must be unique across both phases: recorded answers are
    /// looked up by name in a single results table.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for check in self.pre_approval.iter().chain(&self.post_approval) {
            if check.name.trim().is_empty() {
                return Err(malformed(check, "name is empty"));
            }
            if !seen.insert(check.name.as_str()) {
                return Err(malformed(check, "name is declared twice"));
            }
            if let CheckKind::Script(script) = &check.kind {
                if script.argv.first().is_none_or(|exe| exe.trim().is_empty()) {
                    return Err(malformed(check, "script has no command"));
                }
            }
        }
        Ok(())
    }
}

fn malformed(check: &Check, reason: &str) -> SquawkError {
    SquawkError::MalformedCheck {
        name: check.name.clone(),
        reason: reason.to_string(),
    }
}

/// Checks run by the squawk job.
pub fn default_catalog() -> CheckCatalog {
    CheckCatalog {
        pre_approval: vec![
            Check::script(
                "No merge conflict markers",
                [
                    "sh",
                    "-c",
                    "git grep -n -E '^(<<<<<<<|>>>>>>>) ' -- . ':!*.md' >&2; test $? -eq 1",
                ],
            ),
            Check::script(
                "No whitespace errors",
                ["sh", "-c", "git diff --check HEAD~1 -- ."],
            )
            .ignorable(),
            Check::boolean("Developer has reviewed their changes"),
            Check::text("Release notes").ignorable(),
        ],
        post_approval: vec![
            Check::boolean("QA has verified the change"),
            Check::text("Deployment plan"),
        ],
    }
}
