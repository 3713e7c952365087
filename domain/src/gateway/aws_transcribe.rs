//! Amazon Transcribe client for batch transcription jobs.
//!
//! Jobs read the recording from S3 and write their JSON output back to S3; this module
//! also parses that output document into a [`Transcript`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_transcribe::error::DisplayErrorContext;
use aws_sdk_transcribe::primitives::DateTime as AwsDateTime;
use aws_sdk_transcribe::types::{
    LanguageCode, Media, MediaFormat, TranscriptionJob, TranscriptionJobStatus,
};
use aws_sdk_transcribe::Client;
use chrono::{DateTime, Utc};
use log::*;
use meeting_ai::traits::transcription::Provider;
use meeting_ai::types::transcription::{Config, Job, Status, Token, Transcript};
use meeting_ai::Error as AiError;
use serde::Deserialize;

/// Amazon Transcribe client
pub struct TranscribeClient {
    client: Client,
}

impl TranscribeClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Provider for TranscribeClient {
    async fn start_job(&self, config: Config) -> Result<Job, AiError> {
        debug!(
            "Starting transcription job {} for {}",
            config.job_name, config.media_uri
        );

        let media = Media::builder().media_file_uri(&config.media_uri).build();

        let output = self
            .client
            .start_transcription_job()
            .transcription_job_name(&config.job_name)
            .media(media)
            .media_format(MediaFormat::from(config.media_format.as_str()))
            .language_code(LanguageCode::from(config.language_code.as_str()))
            .output_bucket_name(&config.output.bucket)
            .output_key(&config.output.key)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    "Failed to start transcription job {}: {}",
                    config.job_name,
                    DisplayErrorContext(&e)
                );
                map_error(aws_sdk_transcribe::Error::from(e))
            })?;

        let job = output.transcription_job().ok_or_else(|| {
            AiError::Provider(format!("No job returned when starting {}", config.job_name))
        })?;

        info!("Started transcription job: {}", config.job_name);
        let mut job = to_job(job);
        job.output_location = Some(config.output);
        Ok(job)
    }

    async fn get_job(&self, job_name: &str) -> Result<Job, AiError> {
        let output = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    "Failed to get transcription job {}: {}",
                    job_name,
                    DisplayErrorContext(&e)
                );
                map_error(aws_sdk_transcribe::Error::from(e))
            })?;

        output
            .transcription_job()
            .map(to_job)
            .ok_or_else(|| AiError::NotFound(format!("Transcription job {job_name}")))
    }

    fn provider_id(&self) -> &str {
        "aws_transcribe"
    }
}

fn map_error(err: aws_sdk_transcribe::Error) -> AiError {
    match err {
        aws_sdk_transcribe::Error::NotFoundException(e) => AiError::NotFound(e.to_string()),
        aws_sdk_transcribe::Error::BadRequestException(e) => AiError::Configuration(e.to_string()),
        other => AiError::Provider(DisplayErrorContext(&other).to_string()),
    }
}

fn to_job(job: &TranscriptionJob) -> Job {
    let status = match job.transcription_job_status() {
        Some(TranscriptionJobStatus::Queued) => Status::Queued,
        Some(TranscriptionJobStatus::Completed) => Status::Completed,
        Some(TranscriptionJobStatus::Failed) => Status::Failed,
        Some(TranscriptionJobStatus::InProgress) | None => Status::InProgress,
        Some(other) => {
            warn!("Unrecognized transcription job status: {}", other.as_str());
            Status::InProgress
        }
    };

    Job {
        job_name: job.transcription_job_name().unwrap_or_default().to_string(),
        source_uri: job
            .media()
            .and_then(|m| m.media_file_uri())
            .map(str::to_string),
        output_location: None,
        status,
        failure_reason: job.failure_reason().map(str::to_string),
        created_at: job.creation_time().and_then(to_utc),
        completed_at: job.completion_time().and_then(to_utc),
    }
}

fn to_utc(time: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(time.secs(), time.subsec_nanos())
}

/// Output document written by a completed job.
#[derive(Debug, Deserialize)]
struct OutputDocument {
    results: OutputResults,
}

#[derive(Debug, Deserialize)]
struct OutputResults {
    transcripts: Vec<OutputTranscript>,
    #[serde(default)]
    items: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputTranscript {
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    alternatives: Vec<OutputAlternative>,
}

#[derive(Debug, Deserialize)]
struct OutputAlternative {
    content: String,
}

/// Parse a job output document (`results.transcripts[0].transcript` and `results.items`).
///
/// A document that is not valid JSON or lacks the expected structure is a
/// deserialization error. Items that are individually defective, including a timed
/// item that starts before its predecessor, are a malformed transcript.
pub fn parse_output(document: &[u8]) -> Result<Transcript, AiError> {
    let document: OutputDocument = serde_json::from_slice(document)?;

    let text = document
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|t| t.transcript)
        .ok_or_else(|| AiError::Deserialization("Output has no transcripts".to_string()))?;

    let mut tokens = Vec::with_capacity(document.results.items.len());
    let mut previous_start: Option<f64> = None;

    for (index, item) in document.results.items.into_iter().enumerate() {
        let content = item
            .alternatives
            .into_iter()
            .next()
            .map(|a| a.content)
            .ok_or_else(|| {
                AiError::MalformedTranscript(format!("Item {index} has no alternatives"))
            })?;

        let token = match item.kind.as_str() {
            "punctuation" => Token::punctuation(&content),
            "pronunciation" => {
                let start = parse_time(index, "start_time", item.start_time.as_deref())?;
                let end = parse_time(index, "end_time", item.end_time.as_deref())?;
                if previous_start.is_some_and(|previous| start < previous) {
                    return Err(AiError::MalformedTranscript(format!(
                        "Item {index} starts at {start} before the previous item"
                    )));
                }
                previous_start = Some(start);
                Token::pronunciation(start, end, &content)
            }
            other => {
                return Err(AiError::MalformedTranscript(format!(
                    "Item {index} has unknown type {other}"
                )))
            }
        };
        tokens.push(token);
    }

    Ok(Transcript { text, tokens })
}

fn parse_time(index: usize, field: &str, value: Option<&str>) -> Result<f64, AiError> {
    let value = value
        .ok_or_else(|| AiError::MalformedTranscript(format!("Item {index} has no {field}")))?;
    match value.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
        _ => Err(AiError::MalformedTranscript(format!(
            "Item {index} has invalid {field}: {value}"
        ))),
    }
}
