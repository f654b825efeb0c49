//! Submission types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resources requested from the scheduler for one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
  /// Requested walltime, whole hours.
  pub walltime_hours: u32,
  /// CPUs per task.
  pub cpus: u32,
  /// Memory in GB.
  pub mem_gb: u32,
}

/// One unit of work to submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
  /// Shell command text the scheduled unit runs.
  pub command: String,
  /// Name for the scheduler's accounting.
  pub job_name: String,
  /// Directory receiving the unit's stdout/stderr log files.
  pub log_dir: PathBuf,
  /// Requested resources.
  pub resources: ResourceSpec,
}

/// Captured output of a submission call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutput {
  pub stdout: String,
  pub stderr: String,
}
