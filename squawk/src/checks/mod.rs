//! Squawk checks: declarations, results and recorded answers.
//!
//! A check is either automated (a script) or answered by a human who edits
//! the summary table in the merge request description. Human answers are
//! read back on the next run from the previously rendered table.

pub mod catalog;
pub mod runner;
pub mod script;

use crate::error_handler::CheckExecutionError;
use crate::markdown::{TableRow, parse_table};

pub use catalog::{CheckCatalog, default_catalog};
pub use runner::{CheckRunner, failed_check_names};

/// Marker for a recorded human answer.
pub const INPUT_MARKER: &str = "ℹ️";
pub const PASSED: &str = "✅ Passed";
pub const FAILED: &str = "❌ Failed";
pub const IGNORED: &str = "⚠️ Ignored";

/// Kind of answer an input check expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Passes when the answer reads as true / passed / ✅.
    Boolean,
    /// Passes when any non-empty answer was recorded.
    Text,
}

/// Command line executed for an automated check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCheck {
    pub argv: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    Script(ScriptCheck),
    Input(InputKind),
}

/// A single named gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub kind: CheckKind,
    /// Failures are shown but do not fail the job.
    pub can_ignore: bool,
}

impl Check {
    pub fn script<I, S>(name: impl Into<String>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: CheckKind::Script(ScriptCheck {
                argv: argv.into_iter().map(Into::into).collect(),
            }),
            can_ignore: false,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CheckKind::Input(InputKind::Boolean),
            can_ignore: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CheckKind::Input(InputKind::Text),
            can_ignore: false,
        }
    }

    pub fn ignorable(mut self) -> Self {
        self.can_ignore = true;
        self
    }
}

/// Outcome of one check in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult<'c> {
    pub check: &'c Check,
    pub passed: bool,
    pub user_input: Option<String>,
    pub error: Option<CheckExecutionError>,
}

impl CheckResult<'_> {
    /// Whether this result makes the job fail.
    pub fn blocks(&self) -> bool {
        !self.passed && !self.check.can_ignore
    }

    /// Status cell shown in the summary table.
    pub fn status_text(&self) -> String {
        if let Some(value) = &self.user_input {
            return format!("{INPUT_MARKER} {value}");
        }

        let label = match (&self.check.kind, self.passed, self.check.can_ignore) {
            (_, true, _) => return PASSED.to_string(),
            (_, false, true) => IGNORED,
            // An unanswered input check stays open for the reviewer to fill in.
            (CheckKind::Input(_), false, false) => return format!("{INPUT_MARKER} "),
            (CheckKind::Script(_), false, false) => FAILED,
        };

        match &self.error {
            Some(err) => format!("{label} - {err}"),
            None => label.to_string(),
        }
    }
}

impl TableRow for CheckResult<'_> {
    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "name" => Some(self.check.name.clone()),
            "status" => Some(self.status_text()),
            _ => None,
        }
    }
}

/// A row of a previously rendered results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResult {
    pub name: String,
    pub status: String,
}

impl RecordedResult {
    /// Reads the results table out of a section body.
    pub fn parse_all(body: &str) -> Vec<RecordedResult> {
        parse_table(body)
            .into_iter()
            .filter_map(|mut row| {
                let name = row.remove("name").filter(|n| !n.is_empty())?;
                let status = row.remove("status").unwrap_or_default();
                Some(RecordedResult { name, status })
            })
            .collect()
    }

    /// The human answer carried by this row, if any.
    ///
    /// The input marker written by previous runs is dropped so answers do
    /// not accumulate markers; generated "ignored" cells carry no answer.
    pub fn answer(&self) -> Option<&str> {
        let status = self.status.trim();
        let status = status.strip_prefix(INPUT_MARKER).unwrap_or(status).trim();
        if status.is_empty() || status.starts_with(IGNORED) {
            return None;
        }
        Some(status)
    }
}

/// Finds the recorded row for `name` by exact match.
pub fn find_recorded<'r>(recorded: &'r [RecordedResult], name: &str) -> Option<&'r RecordedResult> {
    recorded.iter().find(|r| r.name == name)
}
