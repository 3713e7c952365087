//! Error types for the `domain` layer.
use meeting_ai::types::skill_card::ErrorCode;
use meeting_ai::Error as MeetingAiError;
use meeting_auth::error::{Error as MeetingAuthError, ErrorKind as MeetingAuthErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Provider errors from `meeting-ai` and `meeting-auth` are translated
/// here so that `web` only ever sees domain error kinds, which it maps onto HTTP
/// status codes. The same kinds select the error code shown on a skill error card.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Invocation(InvocationErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    MalformedTranscript,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    TranscriptionJob,
    TranscriptResultUnavailable,
    TranscriptionTimeout,
    ModelInvocation,
    ObjectStorage,
    RecordingDownload,
    PlatformAuthorization,
    SkillCardPublish,
    Other(String),
}

/// Problems with the inbound skill invocation itself, detected before any pipeline call.
#[derive(Debug, PartialEq)]
pub enum InvocationErrorKind {
    WebhookAuthentication,
    UnsupportedFileType,
    InvalidEvent,
}

impl Error {
    /// Error code reported to the platform on the error card for this error.
    pub fn skill_error_code(&self) -> ErrorCode {
        match &self.error_kind {
            DomainErrorKind::Invocation(InvocationErrorKind::UnsupportedFileType) => {
                ErrorCode::InvalidFileFormat
            }
            DomainErrorKind::Invocation(InvocationErrorKind::InvalidEvent) => {
                ErrorCode::InvalidEvent
            }
            DomainErrorKind::Invocation(InvocationErrorKind::WebhookAuthentication)
            | DomainErrorKind::External(ExternalErrorKind::PlatformAuthorization) => {
                ErrorCode::ExternalAuth
            }
            DomainErrorKind::Internal(InternalErrorKind::MalformedTranscript)
            | DomainErrorKind::External(ExternalErrorKind::RecordingDownload) => {
                ErrorCode::FileProcessing
            }
            DomainErrorKind::External(
                ExternalErrorKind::TranscriptionJob
                | ExternalErrorKind::TranscriptResultUnavailable
                | ExternalErrorKind::TranscriptionTimeout
                | ExternalErrorKind::ModelInvocation,
            ) => ErrorCode::Invocations,
            _ => ErrorCode::Unknown,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<MeetingAuthError> for Error {
    fn from(err: MeetingAuthError) -> Self {
        let error_kind = match &err.error_kind {
            MeetingAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            MeetingAuthErrorKind::Webhook(_) => {
                DomainErrorKind::Invocation(InvocationErrorKind::WebhookAuthentication)
            }
            MeetingAuthErrorKind::Token(_) => {
                DomainErrorKind::Invocation(InvocationErrorKind::InvalidEvent)
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

// Provider errors carry no context about which pipeline step failed, so callers that
// know the step use `external_error` instead. This covers the rest.
impl From<MeetingAiError> for Error {
    fn from(err: MeetingAiError) -> Self {
        let error_kind = match &err {
            MeetingAiError::MalformedTranscript(_) => {
                DomainErrorKind::Internal(InternalErrorKind::MalformedTranscript)
            }
            MeetingAiError::Configuration(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            MeetingAiError::Network(_) | MeetingAiError::Timeout(_) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            other => DomainErrorKind::External(ExternalErrorKind::Other(other.to_string())),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Wrap a lower-layer error as an external error of the given kind.
pub fn external_error<E>(kind: ExternalErrorKind, err: E) -> Error
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    Error {
        source: Some(err.into()),
        error_kind: DomainErrorKind::External(kind),
    }
}

/// Build an internal error carrying a message.
pub fn internal_error(kind: InternalErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Internal(kind),
    }
}

/// Build an invocation error carrying a message.
pub fn invocation_error(kind: InvocationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Invocation(kind),
    }
}
