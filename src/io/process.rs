//! Subprocess invocation boundary for external VCS commands.
//!
//! The core never invokes processes itself; it consumes text lines. These
//! helpers are the external collaborator that obtains that text. Failures
//! are reported to the caller and never retried here.

use crate::core::{ChurnError, Result};
use std::path::Path;
use std::process::Command;

/// Run a program with arguments and return its stdout as text.
pub fn run_command(program: &str, args: &[&str], work_dir: Option<&Path>) -> Result<String> {
    log::debug!("running {} {}", program, args.join(" "));

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = work_dir {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .map_err(|e| ChurnError::Process(format!("failed to run {program}: {e}")))?;

    if !output.status.success() {
        return Err(ChurnError::Process(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Split a full command line on whitespace and run it.
///
/// Sufficient for the VCS command lines this tool is pointed at; quoting is
/// deliberately not interpreted.
pub fn run_command_line(command_line: &str, work_dir: Option<&Path>) -> Result<String> {
    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| ChurnError::Process("empty command line".to_string()))?;
    let args: Vec<&str> = parts.collect();
    run_command(program, &args, work_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_of_successful_command() {
        let output = run_command("echo", &["hello"], None).unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[test]
    fn runs_in_requested_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_command("pwd", &[], Some(dir.path())).unwrap();
        assert_eq!(
            std::fs::canonicalize(output.trim()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let err = run_command("false", &[], None).unwrap_err();
        assert!(matches!(err, ChurnError::Process(_)));
    }

    #[test]
    fn empty_command_line_is_an_error() {
        assert!(run_command_line("   ", None).is_err());
    }
}
