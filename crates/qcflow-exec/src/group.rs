//! Group-level docker invocation.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::ExecError;

/// Default group-mode container image.
pub const DEFAULT_GROUP_IMAGE: &str = "nipreps/mriqc:latest";

/// Runs the QC tool's group-aggregation mode.
#[async_trait]
pub trait GroupQc: Send + Sync {
  /// Run group mode over rawdata and per-subject derivatives.
  async fn run_group(&self, raw_dir: &Path, deriv_dir: &Path) -> Result<(), ExecError>;
}

/// Group mode via `docker run`, executed synchronously where both
/// directories are locally mounted.
#[derive(Debug, Clone)]
pub struct DockerGroup {
  image: String,
}

impl DockerGroup {
  pub fn new(image: String) -> Self {
    Self { image }
  }

  /// Argument vector for the `docker` invocation.
  pub fn docker_args(&self, raw_dir: &Path, deriv_dir: &Path) -> Vec<String> {
    vec![
      "run".to_string(),
      "--rm".to_string(),
      "-v".to_string(),
      format!("{}:/data:ro", raw_dir.display()),
      "-v".to_string(),
      format!("{}:/out", deriv_dir.display()),
      self.image.clone(),
      "/data".to_string(),
      "/out".to_string(),
      "group".to_string(),
    ]
  }
}

impl Default for DockerGroup {
  fn default() -> Self {
    Self::new(DEFAULT_GROUP_IMAGE.to_string())
  }
}

#[async_trait]
impl GroupQc for DockerGroup {
  async fn run_group(&self, raw_dir: &Path, deriv_dir: &Path) -> Result<(), ExecError> {
    let args = self.docker_args(raw_dir, deriv_dir);
    info!(image = %self.image, "running group-level QC");
    debug!(?args, "docker arguments");

    // Like the scheduler, the container's exit status is not the success
    // signal; the group report check downstream is.
    let _ = Command::new("docker")
      .args(&args)
      .output()
      .await
      .map_err(|source| ExecError::Spawn {
        program: "docker".to_string(),
        source,
      })?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  #[test]
  fn test_docker_args_mount_and_mode() {
    let group = DockerGroup::default();
    let args = group.docker_args(
      &PathBuf::from("/data/rawdata"),
      &PathBuf::from("/data/derivatives/mriqc"),
    );
    assert_eq!(args[0], "run");
    assert!(args.contains(&"/data/rawdata:/data:ro".to_string()));
    assert!(args.contains(&"/data/derivatives/mriqc:/out".to_string()));
    assert!(args.contains(&DEFAULT_GROUP_IMAGE.to_string()));
    assert_eq!(args.last().unwrap(), "group");
  }
}
