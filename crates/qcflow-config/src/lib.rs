//! Qcflow Config
//!
//! This crate holds the explicit configuration for a qcflow run: the values
//! captured from the process environment at startup, the filesystem layout
//! contract on both the cluster and the remote store, and the artifact
//! naming rules that act as the completion signal for the pipeline.
//!
//! Nothing here reads ambient process state after construction — the CLI
//! captures an [`Env`] once, merges in its own arguments, and threads the
//! resulting [`Layout`] through the rest of the system.

mod bids;
mod env;
mod error;
mod layout;

pub use bids::{job_name, participant_label, session_label, subject_report_name};
pub use env::Env;
pub use error::ConfigError;
pub use layout::{DEFAULT_PROJECT_DIR, DEFAULT_RESEARCH_BIN, Layout, REMOTE_HOST, REMOTE_PROJECT};
