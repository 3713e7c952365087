//! Handling of one skill invocation delivered by the collaboration platform.
//!
//! A delivery is authenticated, parsed and checked before anything external is called.
//! Once a processing card is posted, every pipeline failure is reported on the file
//! with a single error card and then returned to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use aws_config::SdkConfig;
use log::*;
use meeting_ai::traits::{skills, storage};
use meeting_ai::types::skill_card::ErrorCode;
use meeting_ai::Error as AiError;
use meeting_auth::webhook::{DualKeyWebhookValidator, WebhookValidator};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use service::config::Config;

use crate::error::{
    external_error, internal_error, invocation_error, Error, ExternalErrorKind,
    InternalErrorKind, InvocationErrorKind,
};
use crate::gateway::aws_transcribe::TranscribeClient;
use crate::gateway::bedrock::BedrockClient;
use crate::gateway::box_skills::BoxSkillsClient;
use crate::gateway::s3::S3Store;
use crate::skill_cards::{SkillCardPublisher, PROCESSING_MESSAGE, STATUS_CARD_TITLE};
use crate::summarizer::{SummarySettings, Summarizer};
use crate::transcript_segment::segment_entries;
use crate::transcription_job::{media_format, TranscriptionJobs, TranscriptionSettings};

const WEBHOOK_PROVIDER_ID: &str = "box";
const FAILURE_MESSAGE: &str = "We could not summarize this recording.";

/// Media formats the transcription service accepts.
pub const SUPPORTED_MEDIA_FORMATS: [&str; 8] =
    ["mp3", "mp4", "wav", "flac", "ogg", "amr", "webm", "m4a"];

#[derive(Debug, Deserialize)]
pub struct SkillInvocationEvent {
    /// Invocation id, referenced by every card this invocation produces.
    pub id: String,
    pub skill: SkillRef,
    pub token: InvocationTokens,
    pub source: SourceFile,
}

#[derive(Debug, Deserialize)]
pub struct SkillRef {
    pub id: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct InvocationTokens {
    pub read: AccessToken,
    pub write: AccessToken,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct SourceFile {
    pub id: String,
    pub name: String,
}

impl SkillInvocationEvent {
    pub fn parse(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|e| {
            warn!("Rejecting malformed skill invocation event: {}", e);
            invocation_error(InvocationErrorKind::InvalidEvent, &e.to_string())
        })
    }
}

/// True when the file name's extension is a format the transcription service accepts.
pub fn is_supported_media(file_name: &str) -> bool {
    media_format(file_name)
        .is_some_and(|format| SUPPORTED_MEDIA_FORMATS.contains(&format.as_str()))
}

/// Builds a skills API client from the tokens carried by one invocation.
pub trait SkillsConnector: Send + Sync {
    fn connect(&self, event: &SkillInvocationEvent) -> Result<Arc<dyn skills::Provider>, Error>;
}

pub struct BoxSkillsConnector {
    base_url: String,
}

impl BoxSkillsConnector {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl SkillsConnector for BoxSkillsConnector {
    fn connect(&self, event: &SkillInvocationEvent) -> Result<Arc<dyn skills::Provider>, Error> {
        let client = BoxSkillsClient::new(
            &self.base_url,
            SecretString::new(event.token.read.access_token.expose_secret().clone()),
            SecretString::new(event.token.write.access_token.expose_secret().clone()),
        )?;
        Ok(Arc::new(client))
    }
}

/// How an invocation that passed authentication ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Summary and transcript cards are on the file.
    Published,
    /// The invocation was refused up front and an error card with this code was posted.
    Rejected(ErrorCode),
}

pub struct SkillServices {
    client_id: String,
    validator: Box<dyn WebhookValidator>,
    connector: Box<dyn SkillsConnector>,
    storage: Arc<dyn storage::Provider>,
    jobs: TranscriptionJobs,
    summarizer: Summarizer,
}

impl SkillServices {
    /// Wire the AWS-backed pipeline from configuration.
    pub fn new(config: &Config, sdk_config: &SdkConfig) -> Result<Self, Error> {
        let client_id = required(config.box_client_id(), "BOX_CLIENT_ID")?;
        let primary_key = required(config.box_key_1(), "BOX_KEY_1")?;
        let secondary_key = required(config.box_key_2(), "BOX_KEY_2")?;

        let validator = DualKeyWebhookValidator::new(
            WEBHOOK_PROVIDER_ID.to_string(),
            SecretString::new(primary_key),
            SecretString::new(secondary_key),
        );
        let storage: Arc<dyn storage::Provider> = Arc::new(S3Store::new(sdk_config));
        let jobs = TranscriptionJobs::new(
            Arc::new(TranscribeClient::new(sdk_config)),
            storage.clone(),
            TranscriptionSettings::try_from(config)?,
        );
        let summarizer = Summarizer::new(
            Arc::new(BedrockClient::new(sdk_config)),
            storage.clone(),
            SummarySettings::try_from(config)?,
        );

        Ok(Self::from_parts(
            client_id,
            Box::new(validator),
            Box::new(BoxSkillsConnector::new(config.box_api_base_url())),
            storage,
            jobs,
            summarizer,
        ))
    }

    pub fn from_parts(
        client_id: String,
        validator: Box<dyn WebhookValidator>,
        connector: Box<dyn SkillsConnector>,
        storage: Arc<dyn storage::Provider>,
        jobs: TranscriptionJobs,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            client_id,
            validator,
            connector,
            storage,
            jobs,
            summarizer,
        }
    }

    /// Check the delivery signature. Headers are keyed by lowercase name.
    pub fn authenticate(
        &self,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> Result<(), Error> {
        match self.validator.validate(headers, body) {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!("Rejecting skill invocation with a bad signature");
                Err(invocation_error(
                    InvocationErrorKind::WebhookAuthentication,
                    "Signature does not match either key",
                ))
            }
            Err(e) => {
                warn!("Rejecting skill invocation: {}", e);
                Err(e.into())
            }
        }
    }

    /// Run the pipeline for an authenticated event.
    pub async fn process(&self, event: &SkillInvocationEvent) -> Result<InvocationOutcome, Error> {
        if event.skill.api_key != self.client_id {
            warn!(
                "Skill invocation {} carries an api key for another client",
                event.id
            );
            return Err(invocation_error(
                InvocationErrorKind::WebhookAuthentication,
                "Skill api key does not match the configured client id",
            ));
        }

        let publisher = SkillCardPublisher::new(
            self.connector.connect(event)?,
            &event.skill.id,
            &event.id,
            &event.source.id,
        );

        if !is_supported_media(&event.source.name) {
            info!(
                "Skill invocation {} for unsupported file {}",
                event.id, event.source.name
            );
            let message = format!("{} is not an audio or video recording", event.source.name);
            let err = invocation_error(InvocationErrorKind::UnsupportedFileType, &message);
            let code = err.skill_error_code();
            publisher
                .send_error_card(STATUS_CARD_TITLE, code, &message)
                .await?;
            return Ok(InvocationOutcome::Rejected(code));
        }

        match self.run_pipeline(&publisher, event).await {
            Ok(()) => {
                info!(
                    "Skill invocation {} published results for {}",
                    event.id, event.source.name
                );
                Ok(InvocationOutcome::Published)
            }
            Err(err) => {
                error!("Skill invocation {} failed: {}", event.id, err);
                let code = err.skill_error_code();
                if let Err(card_err) = publisher
                    .send_error_card(STATUS_CARD_TITLE, code, FAILURE_MESSAGE)
                    .await
                {
                    error!(
                        "Could not post error card for invocation {}: {}",
                        event.id, card_err
                    );
                }
                Err(err)
            }
        }
    }

    async fn run_pipeline(
        &self,
        publisher: &SkillCardPublisher,
        event: &SkillInvocationEvent,
    ) -> Result<(), Error> {
        let file_name = &event.source.name;

        publisher
            .send_processing_card(STATUS_CARD_TITLE, PROCESSING_MESSAGE)
            .await?;

        let recording = publisher
            .skills()
            .file_contents(publisher.file_id())
            .await
            .map_err(download_error)?;
        self.storage
            .put_object(
                &self.jobs.settings().recordings_bucket,
                file_name,
                recording,
            )
            .await
            .map_err(|e| external_error(ExternalErrorKind::ObjectStorage, e))?;

        let job = self.jobs.start_job(file_name).await?;
        self.jobs.wait_for_completion(&job.job_name).await?;
        let transcript = self.jobs.fetch_result(&job.job_name).await?;

        let entries = segment_entries(&transcript.tokens)?;
        debug!(
            "Transcript of {} has {} tokens in {} entries",
            file_name,
            transcript.tokens.len(),
            entries.len()
        );

        let summary = self.summarizer.summarize(file_name, &transcript.text).await?;

        publisher.delete_status_card().await?;
        publisher
            .send_results(&summary, entries, transcript.duration_seconds())
            .await
    }
}

/// A download refused with 401/403 means the read token was not accepted; anything else
/// means the recording could not be fetched.
fn download_error(err: AiError) -> Error {
    warn!("Recording download failed: {}", err);
    let kind = match &err {
        AiError::Authentication(_) => ExternalErrorKind::PlatformAuthorization,
        _ => ExternalErrorKind::RecordingDownload,
    };
    external_error(kind, err)
}

fn required(value: Option<String>, name: &str) -> Result<String, Error> {
    value.ok_or_else(|| {
        error!("{} not configured", name);
        internal_error(InternalErrorKind::Config, &format!("{name} is not set"))
    })
}
