//! Scheduler errors.

use std::path::PathBuf;

/// Errors from the scheduler client. A failed launch of the submission
/// command itself is the only failure this layer can observe; whether the
/// scheduled work succeeded is decided by artifact existence downstream.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
  /// The submission command could not be launched.
  #[error("failed to launch '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// A control script could not be written before submission.
  #[error("failed to write control script {path}: {source}")]
  ScriptWrite {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
