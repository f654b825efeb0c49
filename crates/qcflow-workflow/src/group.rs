//! Group runner.

use std::path::{Path, PathBuf};

use qcflow_exec::GroupQc;
use tracing::{info, instrument};

use crate::error::WorkflowError;

/// Runs the QC tool's group-aggregation mode once, synchronously, over
/// already-produced per-subject derivatives. No scheduling, no transport:
/// both directories are expected to be locally mounted.
pub struct GroupRunner<G> {
  qc: G,
  raw_dir: PathBuf,
  deriv_dir: PathBuf,
}

impl<G: GroupQc> GroupRunner<G> {
  pub fn new(qc: G, raw_dir: PathBuf, deriv_dir: PathBuf) -> Self {
    Self {
      qc,
      raw_dir,
      deriv_dir,
    }
  }

  #[instrument(name = "group_run", skip(self), fields(deriv_dir = %self.deriv_dir.display()))]
  pub async fn run(&self) -> Result<(), WorkflowError> {
    self.qc.run_group(&self.raw_dir, &self.deriv_dir).await?;

    let reports = group_reports(&self.deriv_dir)?;
    if reports.is_empty() {
      return Err(WorkflowError::MissingOutput {
        path: self.deriv_dir.join("group*.html"),
      });
    }

    info!(count = reports.len(), "group reports present");
    Ok(())
  }
}

/// Group-level report files (`group*.html`) in the derivatives directory.
fn group_reports(deriv_dir: &Path) -> Result<Vec<PathBuf>, WorkflowError> {
  let mut reports = Vec::new();
  let entries = std::fs::read_dir(deriv_dir).map_err(|source| WorkflowError::Scan {
    path: deriv_dir.to_path_buf(),
    source,
  })?;
  for entry in entries {
    let entry = entry.map_err(|source| WorkflowError::Scan {
      path: deriv_dir.to_path_buf(),
      source,
    })?;
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if name.starts_with("group") && name.ends_with(".html") {
      reports.push(entry.path());
    }
  }
  Ok(reports)
}
