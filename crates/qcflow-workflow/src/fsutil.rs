//! Small filesystem helpers shared by the runner and cleaner.

use std::io;
use std::path::{Path, PathBuf};

/// Directory entries whose file name starts with `prefix`, sorted.
pub(crate) fn entries_with_prefix(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
  let mut entries = Vec::new();
  for entry in std::fs::read_dir(dir)? {
    let entry = entry?;
    if entry.file_name().to_string_lossy().starts_with(prefix) {
      entries.push(entry.path());
    }
  }
  entries.sort();
  Ok(entries)
}

/// Copy a file or directory tree into `dst`. Scratch and project trees live
/// on different mounts, so moving outputs is always copy-then-remove.
pub(crate) fn copy_recursive(src: &Path, dst: &Path) -> io::Result<()> {
  if src.is_dir() {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
      let entry = entry?;
      copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
    }
  } else {
    std::fs::copy(src, dst)?;
  }
  Ok(())
}

/// Remove a file or directory tree; a missing path counts as removed.
pub(crate) fn remove_recursive(path: &Path) -> io::Result<()> {
  let result = if path.is_dir() {
    std::fs::remove_dir_all(path)
  } else {
    std::fs::remove_file(path)
  };
  match result {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}
