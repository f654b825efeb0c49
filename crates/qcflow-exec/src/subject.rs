//! Subject-level singularity command.

use std::path::PathBuf;

use qcflow_config::{participant_label, session_label};

/// Fixed worker-process count handed to the QC tool.
pub const NPROCS: u32 = 8;

/// Builder for the subject-level `singularity run` command line.
///
/// The command is submitted as a scheduled unit, so [`SubjectCommand::build`]
/// produces a single line of shell text rather than an argument vector.
#[derive(Debug, Clone)]
pub struct SubjectCommand {
  /// QC singularity image.
  pub image: PathBuf,
  /// Scratch derivatives root, bound so the tool can reach its work area.
  pub work_deriv: PathBuf,
  /// Scratch QC output directory, bound as the tool's `/out`.
  pub work_mriqc: PathBuf,
  /// Project rawdata, bound read-only as the tool's `/data`.
  pub proj_raw: PathBuf,
  /// Research bin containing the image.
  pub research_bin: PathBuf,
  /// Per-subject/session temporary directory.
  pub tmp_dir: PathBuf,
  /// BIDS subject identifier.
  pub subject: String,
  /// BIDS session identifier.
  pub session: String,
  /// Framewise displacement threshold.
  pub fd_thresh: f64,
}

impl SubjectCommand {
  /// The command as individual tokens.
  pub fn parts(&self) -> Vec<String> {
    let bind = |path: &PathBuf| format!("--bind {}:{}", path.display(), path.display());
    vec![
      "singularity".to_string(),
      "run".to_string(),
      "--cleanenv".to_string(),
      bind(&self.work_deriv),
      bind(&self.proj_raw),
      bind(&self.research_bin),
      format!("--bind {}:/data:ro", self.proj_raw.display()),
      format!("--bind {}:/out", self.work_mriqc.display()),
      self.image.display().to_string(),
      "/data".to_string(),
      "/out".to_string(),
      "participant".to_string(),
      format!("--participant_label {}", participant_label(&self.subject)),
      format!("--session-id {}", session_label(&self.session)),
      format!("--work {}", self.tmp_dir.display()),
      "--no-sub".to_string(),
      format!("--fd_thres {}", self.fd_thresh),
      format!("--nprocs {NPROCS}"),
    ]
  }

  /// The command as one line of shell text, ready for `--wrap`.
  pub fn build(&self) -> String {
    self.parts().join(" ")
  }
}
