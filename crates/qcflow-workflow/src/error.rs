//! Workflow errors.

use std::path::PathBuf;

use qcflow_exec::ExecError;
use qcflow_scheduler::SchedulerError;
use qcflow_transport::TransportError;

/// Errors that abort a pipeline run. Nothing here is retried; every failure
/// propagates to the entrypoint and terminates that subject's processing.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
  /// Remote copy failed.
  #[error("transport failed: {0}")]
  Transport(#[from] TransportError),

  /// The submission call itself failed to launch.
  #[error("scheduling failed: {0}")]
  Scheduler(#[from] SchedulerError),

  /// The group container could not be invoked.
  #[error("qc invocation failed: {0}")]
  Exec(#[from] ExecError),

  /// Cleanup after a successful step failed.
  #[error("cleanup failed: {0}")]
  Cleanup(#[from] CleanupError),

  /// An artifact a previous step should have produced is absent. Signals an
  /// unrecoverable failure in the external QC tool or scheduler.
  #[error("expected output artifact missing: {path}")]
  MissingOutput { path: PathBuf },

  /// A working directory could not be created.
  #[error("failed to prepare directory {path}: {source}")]
  PrepareDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A local directory could not be scanned.
  #[error("failed to scan {path}: {source}")]
  Scan {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Errors from reclaiming scratch and local copies. Surfaced rather than
/// swallowed so partial cleanup is never silent.
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
  /// A directory could not be scanned for subject-prefixed entries.
  #[error("failed to scan {path}: {source}")]
  Scan {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// An output could not be moved out of scratch.
  #[error("failed to move {src} into {dst}: {source}")]
  Move {
    src: PathBuf,
    dst: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A redundant copy could not be removed.
  #[error("failed to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
