use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use qcflow_config::{
  DEFAULT_PROJECT_DIR, DEFAULT_RESEARCH_BIN, Env, Layout, REMOTE_PROJECT, participant_label,
  session_label,
};
use qcflow_exec::DockerGroup;
use qcflow_scheduler::{LocalScheduler, ResourceSpec, SlurmScheduler, SubmitOutput};
use qcflow_transport::RsyncTransport;
use qcflow_workflow::{GroupRunner, SubjectJob, SubjectRunner};

/// Substring the batch entrypoint requires in the hostname.
const CLUSTER_HOST_MARKER: &str = "dcc";

/// Delay between per-subject submissions, a crude throttle on the queue.
const SUBMIT_DELAY: Duration = Duration::from_secs(3);

/// Resources for the detached control job driving one subject's pipeline.
const CONTROL_RESOURCES: ResourceSpec = ResourceSpec {
  walltime_hours: 10,
  cpus: 1,
  mem_gb: 6,
};

/// qcflow - orchestrates MRIQC between the compute cluster and the remote store
#[derive(Parser)]
#[command(name = "qcflow")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Submit subject-level QC for a list of subjects
  Subject {
    /// Subject IDs to submit
    #[arg(short = 's', long = "sub-list", num_args = 1.., required = true)]
    sub_list: Vec<String>,

    /// BIDS session ID
    #[arg(short = 'e', long = "sess", value_parser = ["ses-day2", "ses-day3"])]
    sess: String,

    /// Framewise displacement threshold
    #[arg(long, default_value_t = 0.3)]
    fd_thresh: f64,

    /// BIDS project directory
    #[arg(long, default_value = DEFAULT_PROJECT_DIR)]
    proj_dir: PathBuf,

    /// Parent directory of the QC image
    #[arg(long, default_value = DEFAULT_RESEARCH_BIN)]
    research_bin: PathBuf,

    /// Keep submitting remaining subjects when one submission fails
    #[arg(long)]
    keep_going: bool,
  },

  /// Run the full pipeline for one subject on the current node
  #[command(hide = true)]
  RunSubject {
    /// BIDS subject identifier
    #[arg(long)]
    subject: String,

    /// BIDS session identifier
    #[arg(long)]
    session: String,

    /// Framewise displacement threshold
    #[arg(long, default_value_t = 0.3)]
    fd_thresh: f64,

    /// BIDS project directory
    #[arg(long, default_value = DEFAULT_PROJECT_DIR)]
    proj_dir: PathBuf,

    /// Parent directory of the QC image
    #[arg(long, default_value = DEFAULT_RESEARCH_BIN)]
    research_bin: PathBuf,

    /// Log directory of the batch this run belongs to
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Run the QC unit as a local process instead of a scheduled one
    #[arg(long)]
    local: bool,
  },

  /// Aggregate existing subject-level results into group reports
  Group {
    /// QC derivatives directory
    #[arg(short = 'd', long)]
    deriv_dir: PathBuf,

    /// BIDS rawdata directory (default: the remote project's rawdata mount)
    #[arg(long)]
    raw_dir: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();
  match cli.command {
    Commands::Subject {
      sub_list,
      sess,
      fd_thresh,
      proj_dir,
      research_bin,
      keep_going,
    } => run_subject_batch(sub_list, sess, fd_thresh, proj_dir, research_bin, keep_going),
    Commands::RunSubject {
      subject,
      session,
      fd_thresh,
      proj_dir,
      research_bin,
      log_dir,
      local,
    } => run_subject(
      subject,
      session,
      fd_thresh,
      proj_dir,
      research_bin,
      log_dir,
      local,
    ),
    Commands::Group { deriv_dir, raw_dir } => run_group(deriv_dir, raw_dir),
  }
}

fn run_subject_batch(
  sub_list: Vec<String>,
  sess: String,
  fd_thresh: f64,
  proj_dir: PathBuf,
  research_bin: PathBuf,
  keep_going: bool,
) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    run_subject_batch_async(sub_list, sess, fd_thresh, proj_dir, research_bin, keep_going).await
  })
}

async fn run_subject_batch_async(
  sub_list: Vec<String>,
  sess: String,
  fd_thresh: f64,
  proj_dir: PathBuf,
  research_bin: PathBuf,
  keep_going: bool,
) -> Result<()> {
  let env = Env::capture().context("environment is not configured for qcflow")?;
  env.require_cluster_host(CLUSTER_HOST_MARKER)?;
  let layout = Layout::new(proj_dir, research_bin, &env.user);

  let log_dir = layout.log_dir(&batch_stamp()?);
  for dir in [log_dir.clone(), layout.work_mriqc(), layout.project_mriqc()] {
    tokio::fs::create_dir_all(&dir)
      .await
      .with_context(|| format!("failed to create {}", dir.display()))?;
  }

  let scheduler = SlurmScheduler::new();
  let this_exe = std::env::current_exe().context("failed to resolve qcflow executable path")?;

  for subject in &sub_list {
    let result = submit_control_job(
      &scheduler, &layout, &this_exe, subject, &sess, fd_thresh, &log_dir,
    )
    .await;
    match result {
      Ok(output) => {
        info!(subject = %subject, stdout = %output.stdout.trim(), "control job submitted");
      }
      Err(e) if keep_going => {
        error!(subject = %subject, error = %e, "submission failed, continuing");
      }
      Err(e) => {
        return Err(e).with_context(|| format!("submission failed for {subject}"));
      }
    }
    tokio::time::sleep(SUBMIT_DELAY).await;
  }
  Ok(())
}

/// Write the single-use control script for one subject and submit it
/// detached. The script re-invokes this binary's `run-subject` entrypoint
/// under the scheduler's execution context.
async fn submit_control_job(
  scheduler: &SlurmScheduler,
  layout: &Layout,
  this_exe: &Path,
  subject: &str,
  sess: &str,
  fd_thresh: f64,
  log_dir: &Path,
) -> Result<SubmitOutput> {
  let deriv_dir = layout.subject_session_deriv(subject, sess);
  tokio::fs::create_dir_all(&deriv_dir)
    .await
    .with_context(|| format!("failed to create {}", deriv_dir.display()))?;

  let command = format!(
    "{exe} run-subject --subject {subject} --session {sess} --fd-thresh {fd_thresh} \
     --proj-dir {proj} --research-bin {research} --log-dir {log}",
    exe = this_exe.display(),
    proj = layout.project_dir().display(),
    research = layout.research_bin().display(),
    log = log_dir.display(),
  );

  let control_name = format!("p{}s{}", participant_label(subject), session_label(sess));
  let body = SlurmScheduler::batch_script(
    &control_name,
    &log_dir.join(format!("{control_name}.txt")),
    CONTROL_RESOURCES,
    &command,
  );

  let script = log_dir.join(format!("run_mriqc_{subject}_{sess}.sh"));
  scheduler.write_control_script(&script, &body).await?;
  let output = scheduler.submit_batch_script(&script).await?;
  Ok(output)
}

fn run_subject(
  subject: String,
  session: String,
  fd_thresh: f64,
  proj_dir: PathBuf,
  research_bin: PathBuf,
  log_dir: Option<PathBuf>,
  local: bool,
) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    run_subject_async(
      subject,
      session,
      fd_thresh,
      proj_dir,
      research_bin,
      log_dir,
      local,
    )
    .await
  })
}

async fn run_subject_async(
  subject: String,
  session: String,
  fd_thresh: f64,
  proj_dir: PathBuf,
  research_bin: PathBuf,
  log_dir: Option<PathBuf>,
  local: bool,
) -> Result<()> {
  let env = Env::capture().context("environment is not configured for qcflow")?;
  let layout = Layout::new(proj_dir, research_bin, &env.user);
  let log_dir = match log_dir {
    Some(dir) => dir,
    None => layout.log_dir(&batch_stamp()?),
  };
  let transport = RsyncTransport::new(layout.remote_addr(), env.rsa_key.clone());
  let job = SubjectJob {
    subject,
    session,
    fd_thresh,
  };

  let outcome = if local {
    SubjectRunner::new(
      transport,
      LocalScheduler::new(),
      layout,
      env.sing_image,
      log_dir,
    )
    .run(&job)
    .await?
  } else {
    SubjectRunner::new(
      transport,
      SlurmScheduler::new(),
      layout,
      env.sing_image,
      log_dir,
    )
    .run(&job)
    .await?
  };

  info!(subject = %job.subject, session = %job.session, ?outcome, "subject pipeline done");
  Ok(())
}

fn run_group(deriv_dir: PathBuf, raw_dir: Option<PathBuf>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_group_async(deriv_dir, raw_dir).await })
}

async fn run_group_async(deriv_dir: PathBuf, raw_dir: Option<PathBuf>) -> Result<()> {
  let raw_dir = raw_dir.unwrap_or_else(|| Path::new(REMOTE_PROJECT).join("rawdata"));
  GroupRunner::new(DockerGroup::default(), raw_dir, deriv_dir)
    .run()
    .await
    .context("group-level QC failed")?;
  Ok(())
}

/// Timestamp naming one batch's log directory.
fn batch_stamp() -> Result<String> {
  const STAMP: &[FormatItem<'_>] =
    format_description!("[year repr:last_two]-[month]-[day]_[hour]:[minute]");
  let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
  now.format(STAMP).context("failed to format batch timestamp")
}
