//! Meeting summaries from a hosted foundation model.

use std::sync::Arc;

use log::*;
use meeting_ai::traits::{analysis, storage};
use meeting_ai::types::summarization::{ModelFamily, Request, Style};
use service::config::Config;

use crate::error::{external_error, internal_error, Error, ExternalErrorKind, InternalErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySettings {
    pub model_id: String,
    pub max_tokens: u32,
    pub style: Style,
    /// Bucket the raw generated text is written to.
    pub summary_bucket: String,
}

impl TryFrom<&Config> for SummarySettings {
    type Error = Error;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        let summary_bucket = config.transcribe_bucket().ok_or_else(|| {
            error!("Summary bucket (TRANSCRIBE_BUCKET) not configured");
            internal_error(InternalErrorKind::Config, "TRANSCRIBE_BUCKET is not set")
        })?;
        let style = config.summary_style().parse::<Style>().map_err(|e| {
            error!("Invalid summary style: {}", e);
            internal_error(InternalErrorKind::Config, &e.to_string())
        })?;

        Ok(Self {
            model_id: config.summary_model_id().to_string(),
            max_tokens: config.summary_max_tokens,
            style,
            summary_bucket,
        })
    }
}

/// Storage key of the summary for a recording: the file name with spaces replaced
/// by underscores and commas removed, repeated, with a `.txt` extension.
pub fn summary_key(file_name: &str) -> String {
    let name = file_name.replace(' ', "_").replace(',', "");
    format!("{name}_{name}.txt")
}

pub struct Summarizer {
    model: Arc<dyn analysis::Provider>,
    storage: Arc<dyn storage::Provider>,
    settings: SummarySettings,
}

impl Summarizer {
    pub fn new(
        model: Arc<dyn analysis::Provider>,
        storage: Arc<dyn storage::Provider>,
        settings: SummarySettings,
    ) -> Self {
        Self {
            model,
            storage,
            settings,
        }
    }

    pub fn settings(&self) -> &SummarySettings {
        &self.settings
    }

    /// Summarize a transcript and persist the generated text before returning it.
    pub async fn summarize(&self, file_name: &str, transcript: &str) -> Result<String, Error> {
        let family = ModelFamily::from_model_id(&self.settings.model_id);
        let request = Request::new(self.settings.style.prompt(transcript), family)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(0.0);

        let body = request
            .to_body()
            .and_then(|body| serde_json::to_vec(&body).map_err(Into::into))
            .map_err(|e| external_error(ExternalErrorKind::ModelInvocation, e))?;

        debug!(
            "Summarizing {} with {} ({:?} family) via {}",
            file_name,
            self.settings.model_id,
            family,
            self.model.provider_id()
        );

        let response = self
            .model
            .invoke_model(&self.settings.model_id, body)
            .await
            .map_err(|e| {
                error!("Model {} invocation failed: {}", self.settings.model_id, e);
                external_error(ExternalErrorKind::ModelInvocation, e)
            })?;

        let summary = request.extract_text(&response).map_err(|e| {
            warn!(
                "Model {} response did not match the {:?} shape: {}",
                self.settings.model_id, family, e
            );
            external_error(ExternalErrorKind::ModelInvocation, e)
        })?;

        let key = summary_key(file_name);
        self.storage
            .put_object(
                &self.settings.summary_bucket,
                &key,
                summary.clone().into_bytes(),
            )
            .await
            .map_err(|e| external_error(ExternalErrorKind::ObjectStorage, e))?;
        info!(
            "Stored summary of {} at {}/{}",
            file_name, self.settings.summary_bucket, key
        );

        Ok(summary)
    }
}
