//! Qcflow Exec
//!
//! Command construction for the external QC container. Subject-level runs
//! go through singularity under the batch scheduler; group-level runs go
//! through docker as a direct child process. Both are opaque externals —
//! this crate only builds their invocations and, for group mode, spawns one.

mod error;
mod group;
mod subject;

pub use error::ExecError;
pub use group::{DEFAULT_GROUP_IMAGE, DockerGroup, GroupQc};
pub use subject::{NPROCS, SubjectCommand};
