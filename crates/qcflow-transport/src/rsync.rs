//! Rsync-over-SSH transport.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::transport::Transport;

/// Mirrors files with `rsync -rauv` over keyed SSH.
///
/// `-a` keeps modification times, `-u` skips files already current on the
/// receiving side, so every operation is a mirror that can be re-run.
pub struct RsyncTransport {
  remote_addr: String,
  rsa_key: PathBuf,
}

impl RsyncTransport {
  /// Transport for the given `user@host` address, authenticating with the
  /// key at `rsa_key`.
  pub fn new(remote_addr: String, rsa_key: PathBuf) -> Self {
    Self {
      remote_addr,
      rsa_key,
    }
  }

  /// SSH command passed to rsync's `-e`.
  fn ssh_command(&self) -> String {
    format!("ssh -i {}", self.rsa_key.display())
  }

  /// `addr:path` form of a path on the remote host.
  fn remote_spec(&self, path: &Path) -> String {
    format!("{}:{}", self.remote_addr, path.display())
  }

  /// Build the rsync argument vector. Callers append sources then the
  /// destination; this keeps the flag set in one place.
  fn rsync_args(&self, sources: &[String], dst: &str) -> Vec<String> {
    let mut args = vec![
      "-rauv".to_string(),
      "-e".to_string(),
      self.ssh_command(),
    ];
    args.extend(sources.iter().cloned());
    args.push(dst.to_string());
    args
  }

  async fn run(&self, program: &str, args: &[String]) -> Result<Output, TransportError> {
    debug!(program, ?args, "running transport command");
    let output = Command::new(program)
      .args(args)
      .output()
      .await
      .map_err(|source| TransportError::Spawn {
        program: program.to_string(),
        source,
      })?;

    if !output.status.success() {
      return Err(TransportError::CommandFailed {
        program: program.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      });
    }
    Ok(output)
  }
}

#[async_trait]
impl Transport for RsyncTransport {
  async fn pull(&self, remote_src: &Path, local_dst: &Path) -> Result<(), TransportError> {
    tokio::fs::create_dir_all(local_dst)
      .await
      .map_err(|source| TransportError::CreateDir {
        path: local_dst.to_path_buf(),
        source,
      })?;

    let sources = vec![self.remote_spec(remote_src)];
    let args = self.rsync_args(&sources, &local_dst.display().to_string());
    self.run("rsync", &args).await?;
    info!(src = %remote_src.display(), dst = %local_dst.display(), "pull complete");
    Ok(())
  }

  async fn push(&self, local_srcs: &[PathBuf], remote_dst: &Path) -> Result<(), TransportError> {
    if local_srcs.is_empty() {
      debug!(dst = %remote_dst.display(), "nothing to push");
      return Ok(());
    }

    let sources: Vec<String> = local_srcs
      .iter()
      .map(|p| p.display().to_string())
      .collect();
    let args = self.rsync_args(&sources, &self.remote_spec(remote_dst));
    self.run("rsync", &args).await?;
    info!(
      count = local_srcs.len(),
      dst = %remote_dst.display(),
      "push complete"
    );
    Ok(())
  }

  async fn ensure_remote_dir(&self, remote_dir: &Path) -> Result<(), TransportError> {
    let args = vec![
      "-i".to_string(),
      self.rsa_key.display().to_string(),
      self.remote_addr.clone(),
      format!("mkdir -p {}", remote_dir.display()),
    ];
    self.run("ssh", &args).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn transport() -> RsyncTransport {
    RsyncTransport::new(
      "someone@store.example.edu".to_string(),
      PathBuf::from("/home/someone/.ssh/id_rsa_ls2"),
    )
  }

  #[test]
  fn test_rsync_args_use_keyed_ssh() {
    let t = transport();
    let args = t.rsync_args(
      &["someone@store.example.edu:/data/rawdata/sub-A/ses-1".to_string()],
      "/proj/rawdata/sub-A",
    );
    assert_eq!(args[0], "-rauv");
    assert_eq!(args[1], "-e");
    assert_eq!(args[2], "ssh -i /home/someone/.ssh/id_rsa_ls2");
    assert_eq!(args.last().unwrap(), "/proj/rawdata/sub-A");
  }

  #[test]
  fn test_rsync_args_accept_multiple_sources() {
    let t = transport();
    let args = t.rsync_args(
      &[
        "/proj/derivatives/mriqc/sub-A".to_string(),
        "/proj/derivatives/mriqc/sub-A_ses-1_T1w.html".to_string(),
      ],
      "someone@store.example.edu:/data/derivatives/mriqc",
    );
    // Two sources sit between the flags and the destination.
    assert_eq!(args.len(), 6);
    assert!(args[4].ends_with("T1w.html"));
  }

  #[test]
  fn test_remote_spec() {
    let t = transport();
    assert_eq!(
      t.remote_spec(Path::new("/data/rawdata")),
      "someone@store.example.edu:/data/rawdata"
    );
  }
}
