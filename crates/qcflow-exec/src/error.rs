//! Executor errors.

/// Errors from invoking the QC container directly.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
  /// The container runtime could not be launched.
  #[error("failed to launch '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
}
