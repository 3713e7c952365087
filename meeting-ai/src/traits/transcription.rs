//! Transcription provider trait.

use crate::types::transcription::{Config, Job};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for batch speech-to-text services.
///
/// Jobs run asynchronously on the provider side and write their JSON output to
/// object storage; callers poll `get_job` until the status is terminal.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Submit a transcription job. Returns as soon as the provider accepts it.
    async fn start_job(&self, config: Config) -> std::result::Result<Job, Error>;

    /// Retrieve the current state of a job by name.
    async fn get_job(&self, job_name: &str) -> std::result::Result<Job, Error>;

    /// Return unique identifier for this provider (e.g., "aws_transcribe").
    fn provider_id(&self) -> &str;
}
