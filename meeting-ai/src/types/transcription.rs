//! Types for transcription operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a speech-to-text transcription job.
///
/// Jobs progress Queued → InProgress → Completed (or Failed) within minutes.
/// The owning service deletes jobs after its own retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl Status {
    /// True once the job can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }
}

/// Where the transcription service writes its JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLocation {
    pub bucket: String,
    pub key: String,
}

/// A submitted transcription job as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_name: String,
    pub source_uri: Option<String>,
    pub output_location: Option<OutputLocation>,
    pub status: Status,
    pub failure_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Configuration for submitting a transcription job.
///
/// `media_format` is the file extension without the leading dot (e.g. `mp4`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub job_name: String,
    pub media_uri: String,
    pub media_format: String,
    pub language_code: String,
    pub output: OutputLocation,
}

/// Kind of a transcript token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Pronunciation,
    Punctuation,
}

/// A single timed word or punctuation mark from a completed transcription.
///
/// Punctuation carries no timing; it belongs to whatever word precedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub content: String,
}

impl Token {
    pub fn pronunciation(start_time: f64, end_time: f64, content: &str) -> Self {
        Self {
            kind: TokenKind::Pronunciation,
            start_time: Some(start_time),
            end_time: Some(end_time),
            content: content.to_string(),
        }
    }

    pub fn punctuation(content: &str) -> Self {
        Self {
            kind: TokenKind::Punctuation,
            start_time: None,
            end_time: None,
            content: content.to_string(),
        }
    }
}

/// Display entry grouping contiguous tokens that start within the same second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    pub appears_at_second: u64,
}

/// Parsed output of a completed transcription job.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Full transcript text as a single string.
    pub text: String,
    /// Ordered token sequence.
    pub tokens: Vec<Token>,
}

impl Transcript {
    /// Seconds covered by the transcript, rounded up from the last timed token's end.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.tokens
            .iter()
            .filter_map(|t| t.end_time)
            .fold(None, |max: Option<f64>, end| match max {
                Some(m) if m >= end => Some(m),
                _ => Some(end),
            })
            .map(|secs| secs.ceil() as u64)
    }
}
