//! Build command execution
//!
//! Runs the project's build command through the platform shell with the
//! console streams inherited, so build output reaches the user unchanged.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

use crate::error::DeployError;
use crate::tools::{get_tool_path, shell_command_flag, tools};

pub struct BuildRunner {
    working_dir: PathBuf,
}

impl BuildRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Run `command`; any non-zero exit is a `BuildFailed`
    pub async fn run(&self, command: &str) -> Result<(), DeployError> {
        info!("🔨 Running build: {}", command);

        let status = Command::new(get_tool_path(tools::SHELL))
            .arg(shell_command_flag())
            .arg(command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| DeployError::BuildFailed {
                command: command.to_string(),
                status: format!("could not start: {e}"),
            })?;

        if !status.success() {
            return Err(DeployError::BuildFailed {
                command: command.to_string(),
                status: status.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_successful_build_runs_in_working_dir() {
        let dir = TempDir::new().unwrap();
        let runner = BuildRunner::new(dir.path());
        runner.run("mkdir -p dist && echo hi > dist/index.html").await.unwrap();
        assert!(dir.path().join("dist/index.html").exists());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_build_failure() {
        let dir = TempDir::new().unwrap();
        let err = BuildRunner::new(dir.path()).run("exit 3").await.unwrap_err();
        match err {
            DeployError::BuildFailed { command, status } => {
                assert_eq!(command, "exit 3");
                assert!(status.contains('3'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
