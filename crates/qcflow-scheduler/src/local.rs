//! Local-process fallback.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::SchedulerError;
use crate::scheduler::Scheduler;
use crate::types::{SubmitOutput, SubmitRequest};

/// Runs the submitted command as a local child process and waits for it.
///
/// Substitutes for [`crate::SlurmScheduler`] when no batch scheduler is
/// available — resource requests are accepted and ignored.
#[derive(Debug, Default)]
pub struct LocalScheduler;

impl LocalScheduler {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl Scheduler for LocalScheduler {
  async fn submit_and_wait(&self, req: &SubmitRequest) -> Result<SubmitOutput, SchedulerError> {
    info!(job_name = %req.job_name, "running unit as local process");
    let output = Command::new("bash")
      .arg("-c")
      .arg(&req.command)
      .output()
      .await
      .map_err(|source| SchedulerError::Spawn {
        program: "bash".to_string(),
        source,
      })?;

    Ok(SubmitOutput {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
  }
}
