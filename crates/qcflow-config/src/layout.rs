//! Filesystem layout contract.
//!
//! Paths on three surfaces: the shared project tree on the cluster, the
//! per-user scratch area, and the remote store. The remote store is
//! authoritative; everything local is a working copy.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bids::subject_report_name;

/// Default BIDS project directory on the cluster.
pub const DEFAULT_PROJECT_DIR: &str =
  "/hpc/group/labarlab/EmoRep/Exp2_Compute_Emotion/data_scanner_BIDS";

/// Default research bin, parent directory of the QC image.
pub const DEFAULT_RESEARCH_BIN: &str = "/hpc/group/labarlab/research_bin";

/// Remote storage host.
pub const REMOTE_HOST: &str = "ccn-labarserv2.vm.duke.edu";

/// BIDS project directory on the remote store.
pub const REMOTE_PROJECT: &str = "/mnt/keoki/experiments2/EmoRep/Exp2_Compute_Emotion/data_scanner_BIDS";

const WORK_ROOT: &str = "/work";
const EXPERIMENT: &str = "EmoRep";

/// Resolved path layout for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
  project_dir: PathBuf,
  research_bin: PathBuf,
  work_deriv: PathBuf,
  user: String,
}

impl Layout {
  /// Layout rooted at the given project directory, with scratch space under
  /// the per-user work root.
  pub fn new(project_dir: PathBuf, research_bin: PathBuf, user: &str) -> Self {
    Self::with_work_root(project_dir, research_bin, user, PathBuf::from(WORK_ROOT))
  }

  /// Same as [`Layout::new`] but with an explicit scratch root.
  pub fn with_work_root(
    project_dir: PathBuf,
    research_bin: PathBuf,
    user: &str,
    work_root: PathBuf,
  ) -> Self {
    let work_deriv = work_root.join(user).join(EXPERIMENT);
    Self {
      project_dir,
      research_bin,
      work_deriv,
      user: user.to_string(),
    }
  }

  /// BIDS project root.
  pub fn project_dir(&self) -> &Path {
    &self.project_dir
  }

  /// Project rawdata directory.
  pub fn project_raw(&self) -> PathBuf {
    self.project_dir.join("rawdata")
  }

  /// Project QC derivatives directory.
  pub fn project_mriqc(&self) -> PathBuf {
    self.project_dir.join("derivatives").join("mriqc")
  }

  /// Per-subject/session derivatives directory.
  pub fn subject_session_deriv(&self, subject: &str, session: &str) -> PathBuf {
    self.project_mriqc().join(subject).join(session)
  }

  /// The destination report artifact whose existence marks a run complete.
  pub fn subject_report(&self, subject: &str, session: &str) -> PathBuf {
    self
      .project_mriqc()
      .join(subject_report_name(subject, session))
  }

  /// Research bin containing the QC image.
  pub fn research_bin(&self) -> &Path {
    &self.research_bin
  }

  /// Scratch derivatives root, bound into the container.
  pub fn work_deriv(&self) -> &Path {
    &self.work_deriv
  }

  /// Scratch QC output directory.
  pub fn work_mriqc(&self) -> PathBuf {
    self.work_deriv.join("mriqc")
  }

  /// The report artifact as the QC tool writes it into scratch.
  pub fn work_report(&self, subject: &str, session: &str) -> PathBuf {
    self.work_mriqc().join(subject_report_name(subject, session))
  }

  /// Per-subject/session temporary directory handed to the QC tool.
  pub fn tmp_work(&self, subject: &str, session: &str) -> PathBuf {
    self.work_mriqc().join("tmp_work").join(subject).join(session)
  }

  /// Subject prefix root of the temporary area, removed on cleanup.
  pub fn tmp_work_subject(&self, subject: &str) -> PathBuf {
    self.work_mriqc().join("tmp_work").join(subject)
  }

  /// Log directory for one batch, named by its timestamp.
  pub fn log_dir(&self, stamp: &str) -> PathBuf {
    self.work_deriv.join("logs").join(format!("mriqc_{stamp}"))
  }

  /// `user@host` address of the remote store.
  pub fn remote_addr(&self) -> String {
    format!("{}@{}", self.user, REMOTE_HOST)
  }

  /// Rawdata source on the remote store for one subject/session.
  pub fn remote_raw(&self, subject: &str, session: &str) -> PathBuf {
    Path::new(REMOTE_PROJECT)
      .join("rawdata")
      .join(subject)
      .join(session)
  }

  /// QC derivatives destination on the remote store.
  pub fn remote_mriqc(&self) -> PathBuf {
    Path::new(REMOTE_PROJECT).join("derivatives").join("mriqc")
  }

  /// Per-subject/session derivatives directory on the remote store.
  pub fn remote_subject_session(&self, subject: &str, session: &str) -> PathBuf {
    self.remote_mriqc().join(subject).join(session)
  }
}
