//! SLURM submission via `sbatch`.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::SchedulerError;
use crate::scheduler::Scheduler;
use crate::types::{ResourceSpec, SubmitOutput, SubmitRequest};

/// Scheduler client submitting through `sbatch`.
#[derive(Debug, Default)]
pub struct SlurmScheduler;

impl SlurmScheduler {
  pub fn new() -> Self {
    Self
  }

  /// Argument vector for a blocking `sbatch --wait --wrap` submission.
  pub fn sbatch_args(req: &SubmitRequest) -> Vec<String> {
    let ResourceSpec {
      walltime_hours,
      cpus,
      mem_gb,
    } = req.resources;
    vec![
      "-J".to_string(),
      req.job_name.clone(),
      "-t".to_string(),
      format!("{walltime_hours}:00:00"),
      format!("--cpus-per-task={cpus}"),
      format!("--mem={mem_gb}G"),
      "-o".to_string(),
      req
        .log_dir
        .join(format!("out_{}.log", req.job_name))
        .display()
        .to_string(),
      "-e".to_string(),
      req
        .log_dir
        .join(format!("err_{}.log", req.job_name))
        .display()
        .to_string(),
      "--wait".to_string(),
      format!("--wrap={}", req.command),
    ]
  }

  /// Body of a detached control job: `#SBATCH` headers followed by the
  /// command to run under the scheduler's execution context.
  pub fn batch_script(
    job_name: &str,
    output_log: &Path,
    resources: ResourceSpec,
    command: &str,
  ) -> String {
    format!(
      "#!/bin/bash\n\n\
       #SBATCH --job-name={job_name}\n\
       #SBATCH --output={output}\n\
       #SBATCH --time={hours}:00:00\n\
       #SBATCH --cpus-per-task={cpus}\n\
       #SBATCH --mem={mem}G\n\n\
       {command}\n",
      output = output_log.display(),
      hours = resources.walltime_hours,
      cpus = resources.cpus,
      mem = resources.mem_gb,
    )
  }

  /// Write a single-use control script to disk.
  pub async fn write_control_script(&self, path: &Path, body: &str) -> Result<(), SchedulerError> {
    tokio::fs::write(path, body)
      .await
      .map_err(|source| SchedulerError::ScriptWrite {
        path: path.to_path_buf(),
        source,
      })
  }

  /// Submit a batch script without waiting for it to finish.
  pub async fn submit_batch_script(&self, script: &Path) -> Result<SubmitOutput, SchedulerError> {
    debug!(script = %script.display(), "submitting batch script");
    let output = Command::new("sbatch")
      .arg(script)
      .output()
      .await
      .map_err(|source| SchedulerError::Spawn {
        program: "sbatch".to_string(),
        source,
      })?;

    Ok(SubmitOutput {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
  }
}

#[async_trait]
impl Scheduler for SlurmScheduler {
  async fn submit_and_wait(&self, req: &SubmitRequest) -> Result<SubmitOutput, SchedulerError> {
    let args = Self::sbatch_args(req);
    info!(job_name = %req.job_name, "submitting scheduled unit");
    debug!(?args, "sbatch arguments");

    // Exit status is deliberately not inspected: the unit's success is
    // decided by the artifact checks that follow, not by sbatch.
    let output = Command::new("sbatch")
      .args(&args)
      .output()
      .await
      .map_err(|source| SchedulerError::Spawn {
        program: "sbatch".to_string(),
        source,
      })?;

    let out = SubmitOutput {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    info!(job_name = %req.job_name, "scheduled unit finished");
    Ok(out)
  }
}
