//! Process execution for automated checks.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::checks::ScriptCheck;
use crate::error_handler::CheckExecutionError;

/// Runs the check command to completion.
///
/// Success means exit status 0. On failure the error carries the last
/// non-empty stderr line, or the exit code when stderr is empty. Stdout is
/// not kept.
pub async fn run_script(script: &ScriptCheck) -> Result<(), CheckExecutionError> {
    let (exe, args) = script
        .argv
        .split_first()
        .ok_or_else(|| CheckExecutionError::new("empty command"))?;

    debug!(command = ?script.argv, "running check script");

    let output = Command::new(exe)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CheckExecutionError::new(format!("failed to start {exe}: {e}")))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| match output.status.code() {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        });

    Err(CheckExecutionError::new(message))
}
