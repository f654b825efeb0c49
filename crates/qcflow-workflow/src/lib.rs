//! Qcflow Workflow
//!
//! The coordination layer. [`SubjectRunner`] sequences one subject/session
//! through pull → QC execution → push → cleanup, skipping the billed
//! compute step when the destination artifact already exists.
//! [`GroupRunner`] performs a single group-aggregation run over already
//! produced derivatives. [`Cleaner`] reclaims scratch and local copies once
//! the remote store holds the results.
//!
//! The runners are written against the [`qcflow_transport::Transport`],
//! [`qcflow_scheduler::Scheduler`], and [`qcflow_exec::GroupQc`] seams;
//! success at every step is decided by artifact existence, not exit codes.

mod cleanup;
mod error;
mod fsutil;
mod group;
mod subject;

pub use cleanup::Cleaner;
pub use error::{CleanupError, WorkflowError};
pub use group::GroupRunner;
pub use subject::{RunOutcome, SUBJECT_RESOURCES, SubjectJob, SubjectRunner};
