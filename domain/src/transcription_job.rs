//! Transcription job orchestration: submit, poll with backoff, fetch the output.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::*;
use meeting_ai::traits::{storage, transcription};
use meeting_ai::types::transcription::{
    Config as JobConfig, Job, OutputLocation, Status, Transcript,
};
use meeting_ai::Error as AiError;
use meeting_auth::http::BackoffPolicy;
use service::config::Config;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use crate::error::{external_error, internal_error, Error, ExternalErrorKind, InternalErrorKind};
use crate::gateway::aws_transcribe;

/// How long to wait between status checks and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before the first check; doubles on every later check.
    pub initial: Duration,
    pub max_interval: Duration,
    pub max_wait: Duration,
}

impl PollPolicy {
    fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(u32::MAX)
            .with_base_delay(self.initial)
            .with_max_delay(self.max_interval)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionSettings {
    /// Bucket the recordings are copied into before transcription.
    pub recordings_bucket: String,
    /// Bucket the job writes its JSON output to.
    pub output_bucket: String,
    pub output_prefix: String,
    pub language_code: String,
    pub poll: PollPolicy,
}

impl TryFrom<&Config> for TranscriptionSettings {
    type Error = Error;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        let recordings_bucket = config.storage_bucket().ok_or_else(|| {
            error!("Recordings bucket (STORAGE_BUCKET) not configured");
            internal_error(InternalErrorKind::Config, "STORAGE_BUCKET is not set")
        })?;
        let output_bucket = config.transcribe_bucket().ok_or_else(|| {
            error!("Transcription output bucket (TRANSCRIBE_BUCKET) not configured");
            internal_error(InternalErrorKind::Config, "TRANSCRIBE_BUCKET is not set")
        })?;

        Ok(Self {
            recordings_bucket,
            output_bucket,
            output_prefix: config.transcript_output_prefix().to_string(),
            language_code: config.transcription_language_code().to_string(),
            poll: PollPolicy {
                initial: config.transcription_poll_initial(),
                max_interval: config.transcription_poll_max_interval(),
                max_wait: config.transcription_max_wait(),
            },
        })
    }
}

/// Derive a unique job name from a recording's file name.
///
/// The stem has spaces replaced by underscores and commas and ampersands removed, then
/// gets an underscore and six random lowercase alphanumeric characters appended.
pub fn derive_job_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let base: String = stem
        .chars()
        .filter(|c| !matches!(c, ',' | '&'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{}_{}", base, random_suffix(JOB_SUFFIX_LEN))
}

const JOB_SUFFIX_LEN: usize = 6;

/// Base-36 digits drawn from a v4 UUID.
fn random_suffix(len: usize) -> String {
    let mut bits = Uuid::new_v4().as_u128();
    (0..len)
        .map(|_| {
            let digit = (bits % 36) as u32;
            bits /= 36;
            char::from_digit(digit, 36).unwrap_or('0')
        })
        .collect()
}

/// Lowercased extension of the file name, without the dot.
pub fn media_format(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

pub struct TranscriptionJobs {
    transcriber: Arc<dyn transcription::Provider>,
    storage: Arc<dyn storage::Provider>,
    settings: TranscriptionSettings,
}

impl TranscriptionJobs {
    pub fn new(
        transcriber: Arc<dyn transcription::Provider>,
        storage: Arc<dyn storage::Provider>,
        settings: TranscriptionSettings,
    ) -> Self {
        Self {
            transcriber,
            storage,
            settings,
        }
    }

    pub fn settings(&self) -> &TranscriptionSettings {
        &self.settings
    }

    /// `s3://` URI of a recording in the recordings bucket.
    pub fn source_uri(&self, file_name: &str) -> String {
        format!("s3://{}/{}", self.settings.recordings_bucket, file_name)
    }

    pub fn output_key(&self, job_name: &str) -> String {
        format!("{}/{}.json", self.settings.output_prefix, job_name)
    }

    /// Submit a job for a recording already stored in the recordings bucket.
    pub async fn start_job(&self, file_name: &str) -> Result<Job, Error> {
        let job_name = derive_job_name(file_name);
        let media_format = media_format(file_name).ok_or_else(|| {
            external_error(
                ExternalErrorKind::TranscriptionJob,
                format!("{file_name} has no extension to use as media format"),
            )
        })?;

        let job_config = JobConfig {
            media_uri: self.source_uri(file_name),
            media_format,
            language_code: self.settings.language_code.clone(),
            output: OutputLocation {
                bucket: self.settings.output_bucket.clone(),
                key: self.output_key(&job_name),
            },
            job_name,
        };

        info!(
            "Submitting transcription job {} for {} via {}",
            job_config.job_name,
            job_config.media_uri,
            self.transcriber.provider_id()
        );

        self.transcriber
            .start_job(job_config)
            .await
            .map_err(|e| external_error(ExternalErrorKind::TranscriptionJob, e))
    }

    pub async fn get_status(&self, job_name: &str) -> Result<Job, Error> {
        self.transcriber
            .get_job(job_name)
            .await
            .map_err(|e| external_error(ExternalErrorKind::TranscriptionJob, e))
    }

    /// Poll until the job reaches a terminal state or the maximum wait elapses.
    pub async fn wait_for_completion(&self, job_name: &str) -> Result<Job, Error> {
        let backoff = self.settings.poll.backoff();
        let deadline = Instant::now() + self.settings.poll.max_wait;
        let mut attempt = 0;

        loop {
            let delay = backoff.delay_for(attempt);
            if Instant::now() + delay > deadline {
                warn!(
                    "Transcription job {} did not finish within {:?}",
                    job_name, self.settings.poll.max_wait
                );
                return Err(external_error(
                    ExternalErrorKind::TranscriptionTimeout,
                    format!("Transcription job {job_name} did not finish in time"),
                ));
            }
            sleep(delay).await;
            attempt += 1;

            let job = self.get_status(job_name).await?;
            match job.status {
                Status::Completed => {
                    info!("Transcription job {} completed", job_name);
                    return Ok(job);
                }
                Status::Failed => {
                    let reason = job
                        .failure_reason
                        .unwrap_or_else(|| "no failure reason given".to_string());
                    error!("Transcription job {} failed: {}", job_name, reason);
                    return Err(external_error(
                        ExternalErrorKind::TranscriptionJob,
                        format!("Transcription job {job_name} failed: {reason}"),
                    ));
                }
                status => debug!("Transcription job {} is {:?}", job_name, status),
            }
        }
    }

    /// Read and parse the output of a completed job.
    ///
    /// The output object can become visible shortly after the job reports completion,
    /// so a missing object is retried within the poll window.
    pub async fn fetch_result(&self, job_name: &str) -> Result<Transcript, Error> {
        let key = self.output_key(job_name);
        let bucket = &self.settings.output_bucket;
        let backoff = self.settings.poll.backoff();
        let deadline = Instant::now() + self.settings.poll.max_wait;
        let mut attempt = 0;

        let document = loop {
            match self.storage.get_object(bucket, &key).await {
                Ok(document) => break document,
                Err(err) if err.is_not_found() => {
                    let delay = backoff.delay_for(attempt);
                    if Instant::now() + delay > deadline {
                        return Err(external_error(
                            ExternalErrorKind::TranscriptResultUnavailable,
                            err,
                        ));
                    }
                    debug!("Output {} not visible yet, retrying in {:?}", key, delay);
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!("Failed to read transcription output {}: {}", key, err);
                    return Err(external_error(
                        ExternalErrorKind::TranscriptResultUnavailable,
                        err,
                    ));
                }
            }
        };

        aws_transcribe::parse_output(&document).map_err(|err| match err {
            AiError::MalformedTranscript(_) => err.into(),
            other => external_error(ExternalErrorKind::TranscriptResultUnavailable, other),
        })
    }
}
