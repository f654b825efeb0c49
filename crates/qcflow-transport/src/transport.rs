//! The transport seam.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::TransportError;

/// Bidirectional file copy between the remote store and local paths.
///
/// Remote paths are paths on the remote host's filesystem; the
/// implementation owns the address and credential needed to reach them.
#[async_trait]
pub trait Transport: Send + Sync {
  /// Mirror a remote directory into a local destination directory.
  async fn pull(&self, remote_src: &Path, local_dst: &Path) -> Result<(), TransportError>;

  /// Mirror local sources into a remote destination directory.
  async fn push(&self, local_srcs: &[PathBuf], remote_dst: &Path) -> Result<(), TransportError>;

  /// Create a directory (and parents) on the remote host.
  async fn ensure_remote_dir(&self, remote_dir: &Path) -> Result<(), TransportError>;
}
