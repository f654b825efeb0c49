//! Filesystem cleaner.
//!
//! Reclaims the per-subject work space after a successful QC run and drops
//! local copies once the remote store holds the results. Every deletion is
//! a checked result; only a missing target counts as already clean.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::CleanupError;
use crate::fsutil::{copy_recursive, entries_with_prefix, remove_recursive};

/// Removes one subject's intermediate and duplicate files.
///
/// Callers invoke [`Cleaner::clean_group`] only after a successful push —
/// the remote store is authoritative and local copies are expendable.
pub struct Cleaner {
  subject: String,
  proj_mriqc: PathBuf,
}

impl Cleaner {
  /// Cleaner for one subject, relative to the project derivatives dir.
  pub fn new(subject: impl Into<String>, proj_mriqc: PathBuf) -> Self {
    Self {
      subject: subject.into(),
      proj_mriqc,
    }
  }

  /// Move the subject's outputs from scratch into the project derivatives
  /// area, then delete the scratch copies and the temporary work tree.
  pub fn clean_work(&self, work_mriqc: &Path, tmp_subject: &Path) -> Result<(), CleanupError> {
    let outputs =
      entries_with_prefix(work_mriqc, &self.subject).map_err(|source| CleanupError::Scan {
        path: work_mriqc.to_path_buf(),
        source,
      })?;

    for src in outputs {
      let Some(name) = src.file_name() else {
        continue;
      };
      let dst = self.proj_mriqc.join(name);
      copy_recursive(&src, &dst).map_err(|source| CleanupError::Move {
        src: src.clone(),
        dst: dst.clone(),
        source,
      })?;
      remove_recursive(&src).map_err(|source| CleanupError::Remove {
        path: src.clone(),
        source,
      })?;
    }

    remove_recursive(tmp_subject).map_err(|source| CleanupError::Remove {
      path: tmp_subject.to_path_buf(),
      source,
    })?;

    info!(subject = %self.subject, "work space reclaimed");
    Ok(())
  }

  /// Delete the subject's local raw input and derivatives copies.
  pub fn clean_group(&self, proj_raw: &Path) -> Result<(), CleanupError> {
    remove_recursive(&proj_raw.join(&self.subject)).map_err(|source| CleanupError::Remove {
      path: proj_raw.join(&self.subject),
      source,
    })?;

    let derivs =
      entries_with_prefix(&self.proj_mriqc, &self.subject).map_err(|source| CleanupError::Scan {
        path: self.proj_mriqc.clone(),
        source,
      })?;
    for path in derivs {
      remove_recursive(&path).map_err(|source| CleanupError::Remove {
        path: path.clone(),
        source,
      })?;
    }

    info!(subject = %self.subject, "local copies removed");
    Ok(())
  }
}
