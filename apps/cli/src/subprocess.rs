use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use contentimport_core::batch::{StepExecutor, StepRequest};
use contentimport_core::errors::{Result, StepExecutionError};

/// Runs every step in a child process of this binary (`execute-batch`).
///
/// The child inherits the environment, so it opens the same database and
/// settings file. Its stdout carries the processed record count, stderr is
/// passed through.
pub struct SubprocessStepExecutor {
    program: PathBuf,
}

impl SubprocessStepExecutor {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    pub fn current_exe() -> Result<Self> {
        let program =
            std::env::current_exe().map_err(|e| StepExecutionError::Spawn(e.to_string()))?;
        Ok(Self::new(program))
    }
}

/// Last non-empty stdout line, as a record count.
fn parse_step_output(stdout: &str) -> Result<usize> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .and_then(|line| line.parse::<usize>().ok())
        .ok_or_else(|| StepExecutionError::InvalidOutput(stdout.to_string()).into())
}

#[async_trait]
impl StepExecutor for SubprocessStepExecutor {
    async fn execute(&self, request: &StepRequest) -> Result<usize> {
        log::debug!(
            "Spawning {} {}",
            self.program.display(),
            request.to_args().join(" ")
        );
        let output = Command::new(&self.program)
            .args(request.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| StepExecutionError::Spawn(e.to_string()))?;

        match output.status.code() {
            Some(0) => parse_step_output(&String::from_utf8_lossy(&output.stdout)),
            Some(code) => Err(StepExecutionError::SubCommandFailed(code).into()),
            None => Err(StepExecutionError::Terminated.into()),
        }
    }
}
