//! Transport errors.

use std::path::PathBuf;

/// Errors from remote copy operations. All are fatal: re-invoking a partial
/// transfer is not proven safe at this layer, so nothing retries.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
  /// The transport binary could not be launched at all.
  #[error("failed to launch '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The transport command ran and exited non-zero.
  #[error("'{program}' exited with status {code:?}: {stderr}")]
  CommandFailed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },

  /// A local destination directory could not be created before a pull.
  #[error("failed to create local directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
