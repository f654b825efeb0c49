//! Qcflow Scheduler
//!
//! Client for the external batch scheduler. The [`Scheduler`] trait carries
//! a single capability, submit-and-wait, so the pipeline never depends on
//! one scheduler's invocation model: [`SlurmScheduler`] submits through
//! `sbatch --wait`, [`LocalScheduler`] runs the same command as a local
//! child process.
//!
//! Completion is verified by downstream artifact checks, not by the
//! submission's exit status — the scheduler is treated as best-effort and
//! real-world effects are what count.

mod error;
mod local;
mod scheduler;
mod slurm;
mod types;

pub use error::SchedulerError;
pub use local::LocalScheduler;
pub use scheduler::Scheduler;
pub use slurm::SlurmScheduler;
pub use types::{ResourceSpec, SubmitOutput, SubmitRequest};
