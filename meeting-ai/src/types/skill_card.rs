//! Skill cards: structured annotations attached to a file and rendered by the
//! collaboration platform's viewer.

use serde::{Deserialize, Serialize};

use super::transcription::Entry;

/// Status codes understood by the platform for both invocations and status cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Invoked,
    Processing,
    Success,
    TransientFailure,
    PermanentFailure,
}

/// Error codes a skill may report back to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "skills_file_processing_error")]
    FileProcessing,
    #[serde(rename = "skills_invalid_file_size_error")]
    InvalidFileSize,
    #[serde(rename = "skills_invalid_file_format_error")]
    InvalidFileFormat,
    #[serde(rename = "skills_invalid_event_error")]
    InvalidEvent,
    #[serde(rename = "skills_no_info_found")]
    NoInfoFound,
    #[serde(rename = "skills_invocations_error")]
    Invocations,
    #[serde(rename = "skills_external_auth_error")]
    ExternalAuth,
    #[serde(rename = "skills_billing_error")]
    Billing,
    #[serde(rename = "skills_unknown_error")]
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FileProcessing => "skills_file_processing_error",
            ErrorCode::InvalidFileSize => "skills_invalid_file_size_error",
            ErrorCode::InvalidFileFormat => "skills_invalid_file_format_error",
            ErrorCode::InvalidEvent => "skills_invalid_event_error",
            ErrorCode::NoInfoFound => "skills_no_info_found",
            ErrorCode::Invocations => "skills_invocations_error",
            ErrorCode::ExternalAuth => "skills_external_auth_error",
            ErrorCode::Billing => "skills_billing_error",
            ErrorCode::Unknown => "skills_unknown_error",
        }
    }

    /// Message shown to users on the error card.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::FileProcessing => "We could not process this recording.",
            ErrorCode::InvalidFileSize => "This recording is too large to process.",
            ErrorCode::InvalidFileFormat => "This file format is not supported for transcription.",
            ErrorCode::InvalidEvent => "The skill received an invalid event.",
            ErrorCode::NoInfoFound => "No speech was found in this recording.",
            ErrorCode::Invocations => "The transcription or summarization service failed.",
            ErrorCode::ExternalAuth => "The skill could not authenticate with an external service.",
            ErrorCode::Billing => "The skill's service account has a billing problem.",
            ErrorCode::Unknown => "Something went wrong while processing this recording.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ObjectType {
    SkillCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SkillType {
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum InvocationType {
    SkillInvocation,
}

/// `{code, message}` title pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub code: String,
    pub message: String,
}

impl Title {
    /// Title whose code is derived from the message: `skill_` + lowercase, spaces to `_`.
    pub fn from_message(message: &str) -> Self {
        Self {
            code: format!("skill_{}", message.to_lowercase().replace(' ', "_")),
            message: message.to_string(),
        }
    }

    pub fn with_code(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRef {
    #[serde(rename = "type")]
    kind: SkillType,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRef {
    #[serde(rename = "type")]
    kind: InvocationType,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStatus {
    pub code: Status,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub start: u64,
}

/// One line of a transcript card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appears: Option<Vec<Appearance>>,
}

impl CardEntry {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            appears: None,
        }
    }
}

impl From<Entry> for CardEntry {
    fn from(entry: Entry) -> Self {
        Self {
            text: entry.text,
            appears: Some(vec![Appearance {
                start: entry.appears_at_second,
            }]),
        }
    }
}

/// Variant-specific part of a card, tagged by `skill_card_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "skill_card_type", rename_all = "snake_case")]
pub enum Body {
    Status {
        status: CardStatus,
    },
    Transcript {
        entries: Vec<CardEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
    },
}

/// A status or transcript card referencing the skill and the invocation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCard {
    #[serde(rename = "type")]
    kind: ObjectType,
    pub skill_card_title: Title,
    pub skill: SkillRef,
    pub invocation: InvocationRef,
    #[serde(flatten)]
    pub body: Body,
}

impl SkillCard {
    fn new(skill_id: &str, invocation_id: &str, title: Title, body: Body) -> Self {
        Self {
            kind: ObjectType::SkillCard,
            skill_card_title: title,
            skill: SkillRef {
                kind: SkillType::Service,
                id: skill_id.to_string(),
            },
            invocation: InvocationRef {
                kind: InvocationType::SkillInvocation,
                id: invocation_id.to_string(),
            },
            body,
        }
    }

    pub fn status(
        skill_id: &str,
        invocation_id: &str,
        title: Title,
        code: Status,
        message: &str,
    ) -> Self {
        Self::new(
            skill_id,
            invocation_id,
            title,
            Body::Status {
                status: CardStatus {
                    code,
                    message: message.to_string(),
                },
            },
        )
    }

    pub fn transcript(
        skill_id: &str,
        invocation_id: &str,
        title: Title,
        entries: Vec<CardEntry>,
        duration: Option<u64>,
    ) -> Self {
        Self::new(
            skill_id,
            invocation_id,
            title,
            Body::Transcript { entries, duration },
        )
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation.id
    }

    pub fn is_status(&self) -> bool {
        matches!(self.body, Body::Status { .. })
    }
}
