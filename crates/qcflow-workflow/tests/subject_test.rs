//! Integration tests for the subject pipeline runner, using fake transport
//! and scheduler implementations against temporary directories.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use qcflow_config::Layout;
use qcflow_scheduler::{Scheduler, SchedulerError, SubmitOutput, SubmitRequest};
use qcflow_transport::{Transport, TransportError};
use qcflow_workflow::{RunOutcome, SUBJECT_RESOURCES, SubjectJob, SubjectRunner, WorkflowError};

/// Records every call and mirrors pushes into a local "remote" directory.
#[derive(Clone)]
struct FakeTransport {
  remote_root: PathBuf,
  pulls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
  pushes: Arc<Mutex<Vec<Vec<PathBuf>>>>,
  ensured_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeTransport {
  fn new(remote_root: PathBuf) -> Self {
    Self {
      remote_root,
      pulls: Arc::new(Mutex::new(Vec::new())),
      pushes: Arc::new(Mutex::new(Vec::new())),
      ensured_dirs: Arc::new(Mutex::new(Vec::new())),
    }
  }
}

fn copy_tree(src: &Path, dst: &Path) {
  if src.is_dir() {
    std::fs::create_dir_all(dst).expect("mkdir failed");
    for entry in std::fs::read_dir(src).expect("read_dir failed") {
      let entry = entry.expect("entry failed");
      copy_tree(&entry.path(), &dst.join(entry.file_name()));
    }
  } else {
    std::fs::copy(src, dst).expect("copy failed");
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn pull(&self, remote_src: &Path, local_dst: &Path) -> Result<(), TransportError> {
    std::fs::create_dir_all(local_dst).expect("mkdir failed");
    std::fs::write(local_dst.join("T1w.nii.gz"), b"raw").expect("write failed");
    self
      .pulls
      .lock()
      .unwrap()
      .push((remote_src.to_path_buf(), local_dst.to_path_buf()));
    Ok(())
  }

  async fn push(&self, local_srcs: &[PathBuf], _remote_dst: &Path) -> Result<(), TransportError> {
    for src in local_srcs {
      copy_tree(src, &self.remote_root.join(src.file_name().unwrap()));
    }
    self.pushes.lock().unwrap().push(local_srcs.to_vec());
    Ok(())
  }

  async fn ensure_remote_dir(&self, remote_dir: &Path) -> Result<(), TransportError> {
    self
      .ensured_dirs
      .lock()
      .unwrap()
      .push(remote_dir.to_path_buf());
    Ok(())
  }
}

/// Records submissions and plants the artifact a real QC run would produce.
#[derive(Clone)]
struct FakeScheduler {
  artifact: Option<PathBuf>,
  submissions: Arc<Mutex<Vec<SubmitRequest>>>,
}

impl FakeScheduler {
  fn producing(artifact: PathBuf) -> Self {
    Self {
      artifact: Some(artifact),
      submissions: Arc::new(Mutex::new(Vec::new())),
    }
  }

  fn producing_nothing() -> Self {
    Self {
      artifact: None,
      submissions: Arc::new(Mutex::new(Vec::new())),
    }
  }
}

#[async_trait]
impl Scheduler for FakeScheduler {
  async fn submit_and_wait(&self, req: &SubmitRequest) -> Result<SubmitOutput, SchedulerError> {
    self.submissions.lock().unwrap().push(req.clone());
    if let Some(artifact) = &self.artifact {
      if let Some(parent) = artifact.parent() {
        std::fs::create_dir_all(parent).expect("mkdir failed");
      }
      std::fs::write(artifact, b"<html/>").expect("write failed");
    }
    Ok(SubmitOutput {
      stdout: String::new(),
      stderr: String::new(),
    })
  }
}

struct Fixture {
  _dir: tempfile::TempDir,
  layout: Layout,
  transport: FakeTransport,
  remote_root: PathBuf,
}

fn fixture() -> Fixture {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  let layout = Layout::with_work_root(
    dir.path().join("proj"),
    dir.path().join("research_bin"),
    "tester",
    dir.path().join("work"),
  );
  let remote_root = dir.path().join("remote");
  std::fs::create_dir_all(&remote_root).expect("mkdir failed");
  let transport = FakeTransport::new(remote_root.clone());
  Fixture {
    _dir: dir,
    layout,
    transport,
    remote_root,
  }
}

fn job() -> SubjectJob {
  SubjectJob {
    subject: "sub-ER0009".to_string(),
    session: "ses-day2".to_string(),
    fd_thresh: 0.3,
  }
}

fn runner<S: Scheduler>(fx: &Fixture, scheduler: S) -> SubjectRunner<FakeTransport, S> {
  SubjectRunner::new(
    fx.transport.clone(),
    scheduler,
    fx.layout.clone(),
    PathBuf::from("/research_bin/mriqc.simg"),
    fx.layout.log_dir("25-01-31_09:30"),
  )
}

#[tokio::test]
async fn test_full_run_pulls_executes_pushes_and_cleans() {
  let fx = fixture();
  let scheduler = FakeScheduler::producing(fx.layout.work_report("sub-ER0009", "ses-day2"));

  let outcome = runner(&fx, scheduler.clone())
    .run(&job())
    .await
    .expect("run failed");
  assert_eq!(outcome, RunOutcome::Completed);

  // Pull came from the subject/session rawdata location.
  let pulls = fx.transport.pulls.lock().unwrap();
  assert_eq!(pulls.len(), 1);
  assert!(pulls[0].0.ends_with("rawdata/sub-ER0009/ses-day2"));
  assert_eq!(pulls[0].1, fx.layout.project_raw().join("sub-ER0009"));

  // Exactly one scheduled submission, with the contracted name and resources.
  let submissions = scheduler.submissions.lock().unwrap();
  assert_eq!(submissions.len(), 1);
  assert_eq!(submissions[0].job_name, "ER0009sday2_mriqc");
  assert_eq!(submissions[0].resources, SUBJECT_RESOURCES);
  assert!(submissions[0].command.contains("--participant_label ER0009"));
  assert!(submissions[0].command.contains("--fd_thres 0.3"));

  // Round trip: the remote store ends up holding the report artifact.
  assert!(fx.remote_root.join("sub-ER0009_ses-day2_T1w.html").exists());

  // Scratch and local copies are gone.
  assert!(!fx.layout.work_report("sub-ER0009", "ses-day2").exists());
  assert!(!fx.layout.tmp_work_subject("sub-ER0009").exists());
  assert!(!fx.layout.project_raw().join("sub-ER0009").exists());
  assert!(
    !fx
      .layout
      .subject_report("sub-ER0009", "ses-day2")
      .exists()
  );
}

#[tokio::test]
async fn test_existing_destination_skips_qc_but_still_pushes_and_cleans() {
  let fx = fixture();
  let report = fx.layout.subject_report("sub-ER0009", "ses-day2");
  std::fs::create_dir_all(report.parent().unwrap()).expect("mkdir failed");
  std::fs::write(&report, b"<html/>").expect("write failed");

  let scheduler = FakeScheduler::producing_nothing();
  let outcome = runner(&fx, scheduler.clone())
    .run(&job())
    .await
    .expect("run failed");
  assert_eq!(outcome, RunOutcome::SkippedExisting);

  // No billed compute.
  assert!(scheduler.submissions.lock().unwrap().is_empty());

  // Push and cleanup of raw/derivative copies still happened.
  assert!(fx.remote_root.join("sub-ER0009_ses-day2_T1w.html").exists());
  assert_eq!(fx.transport.pushes.lock().unwrap().len(), 1);
  assert!(!fx.layout.project_raw().join("sub-ER0009").exists());
  assert!(!report.exists());
}

#[tokio::test]
async fn test_missing_work_artifact_is_fatal() {
  let fx = fixture();
  let scheduler = FakeScheduler::producing_nothing();

  let err = runner(&fx, scheduler.clone())
    .run(&job())
    .await
    .expect_err("run should fail");
  assert!(matches!(err, WorkflowError::MissingOutput { .. }));

  // The unit was submitted; the artifact check is what failed.
  assert_eq!(scheduler.submissions.lock().unwrap().len(), 1);
  // Nothing was pushed after the failure.
  assert!(fx.transport.pushes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_remote_destination_is_prepared_before_push() {
  let fx = fixture();
  let scheduler = FakeScheduler::producing(fx.layout.work_report("sub-ER0009", "ses-day2"));

  runner(&fx, scheduler).run(&job()).await.expect("run failed");

  let ensured = fx.transport.ensured_dirs.lock().unwrap();
  assert_eq!(ensured.len(), 1);
  assert!(ensured[0].ends_with("derivatives/mriqc/sub-ER0009/ses-day2"));
}
