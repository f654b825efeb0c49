//! The scheduler seam.

use async_trait::async_trait;

use crate::error::SchedulerError;
use crate::types::{SubmitOutput, SubmitRequest};

/// Submits a unit of work and blocks until it terminates.
#[async_trait]
pub trait Scheduler: Send + Sync {
  /// Submit `req` and wait for the scheduled unit to finish.
  ///
  /// Returns the captured output of the submission call. Implementations do
  /// not interpret the unit's exit status; callers verify effects instead.
  async fn submit_and_wait(&self, req: &SubmitRequest) -> Result<SubmitOutput, SchedulerError>;
}
