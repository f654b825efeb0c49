//! Subject pipeline runner.

use std::path::PathBuf;

use qcflow_config::{Layout, job_name};
use qcflow_exec::SubjectCommand;
use qcflow_scheduler::{ResourceSpec, Scheduler, SubmitRequest};
use qcflow_transport::Transport;
use tracing::{info, instrument};

use crate::cleanup::Cleaner;
use crate::error::WorkflowError;
use crate::fsutil::entries_with_prefix;

/// Resources requested for one subject-level QC unit.
pub const SUBJECT_RESOURCES: ResourceSpec = ResourceSpec {
  walltime_hours: 16,
  cpus: 10,
  mem_gb: 24,
};

/// One subject/session unit of work. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SubjectJob {
  /// BIDS subject identifier.
  pub subject: String,
  /// BIDS session identifier.
  pub session: String,
  /// Framewise displacement threshold.
  pub fd_thresh: f64,
}

/// What a run actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  /// QC executed and produced the destination artifact.
  Completed,
  /// The destination artifact already existed; QC was not invoked.
  SkippedExisting,
}

/// Sequences one subject/session through pull → QC → push → cleanup.
///
/// Each step is a hard dependency on the previous one succeeding; there are
/// no retries. The one idempotent behavior in the system is the destination
/// existence check, which skips the billed compute step on re-invocation
/// while still pushing and cleaning local copies.
pub struct SubjectRunner<T, S> {
  transport: T,
  scheduler: S,
  layout: Layout,
  image: PathBuf,
  log_dir: PathBuf,
}

impl<T: Transport, S: Scheduler> SubjectRunner<T, S> {
  pub fn new(transport: T, scheduler: S, layout: Layout, image: PathBuf, log_dir: PathBuf) -> Self {
    Self {
      transport,
      scheduler,
      layout,
      image,
      log_dir,
    }
  }

  #[instrument(
    name = "subject_run",
    skip(self, job),
    fields(subject = %job.subject, session = %job.session)
  )]
  pub async fn run(&self, job: &SubjectJob) -> Result<RunOutcome, WorkflowError> {
    self.prepare_dirs(job).await?;

    let remote_src = self.layout.remote_raw(&job.subject, &job.session);
    let local_raw = self.layout.project_raw().join(&job.subject);
    self.transport.pull(&remote_src, &local_raw).await?;

    let report = self.layout.subject_report(&job.subject, &job.session);
    let outcome = if report.exists() {
      info!(report = %report.display(), "destination artifact exists, skipping QC");
      RunOutcome::SkippedExisting
    } else {
      self.execute(job).await?;
      let cleaner = Cleaner::new(job.subject.clone(), self.layout.project_mriqc());
      cleaner.clean_work(
        &self.layout.work_mriqc(),
        &self.layout.tmp_work_subject(&job.subject),
      )?;
      RunOutcome::Completed
    };

    self.push(job).await?;

    // Remote store now holds the results; local raw and derivative copies
    // are redundant and bound only to grow across invocations.
    let cleaner = Cleaner::new(job.subject.clone(), self.layout.project_mriqc());
    cleaner.clean_group(&self.layout.project_raw())?;

    info!(?outcome, "subject pipeline finished");
    Ok(outcome)
  }

  async fn prepare_dirs(&self, job: &SubjectJob) -> Result<(), WorkflowError> {
    let dirs = [
      self.layout.subject_session_deriv(&job.subject, &job.session),
      self.layout.work_mriqc(),
      self.layout.tmp_work(&job.subject, &job.session),
      self.log_dir.clone(),
    ];
    for dir in dirs {
      tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| WorkflowError::PrepareDir { path: dir, source })?;
    }
    Ok(())
  }

  /// Submit the QC container as a scheduled unit and verify its artifact.
  async fn execute(&self, job: &SubjectJob) -> Result<(), WorkflowError> {
    let command = SubjectCommand {
      image: self.image.clone(),
      work_deriv: self.layout.work_deriv().to_path_buf(),
      work_mriqc: self.layout.work_mriqc(),
      proj_raw: self.layout.project_raw(),
      research_bin: self.layout.research_bin().to_path_buf(),
      tmp_dir: self.layout.tmp_work(&job.subject, &job.session),
      subject: job.subject.clone(),
      session: job.session.clone(),
      fd_thresh: job.fd_thresh,
    }
    .build();

    let req = SubmitRequest {
      command,
      job_name: job_name(&job.subject, &job.session),
      log_dir: self.log_dir.clone(),
      resources: SUBJECT_RESOURCES,
    };
    self.scheduler.submit_and_wait(&req).await?;

    let produced = self.layout.work_report(&job.subject, &job.session);
    if !produced.exists() {
      return Err(WorkflowError::MissingOutput { path: produced });
    }
    Ok(())
  }

  /// Mirror the subject's derivatives back to the remote store.
  async fn push(&self, job: &SubjectJob) -> Result<(), WorkflowError> {
    self
      .transport
      .ensure_remote_dir(&self.layout.remote_subject_session(&job.subject, &job.session))
      .await?;

    let proj_mriqc = self.layout.project_mriqc();
    let sources =
      entries_with_prefix(&proj_mriqc, &job.subject).map_err(|source| WorkflowError::Scan {
        path: proj_mriqc,
        source,
      })?;
    self
      .transport
      .push(&sources, &self.layout.remote_mriqc())
      .await?;
    Ok(())
  }
}
