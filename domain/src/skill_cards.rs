//! Publishing skill cards for one invocation.
//!
//! Status cards (processing and error) are written through the invocation update, which
//! replaces every card on the file. Result cards are attached after the status card is
//! removed.

use std::sync::Arc;

use log::*;
use meeting_ai::traits::skills::{self, InvocationUpdate};
use meeting_ai::types::skill_card::{CardEntry, ErrorCode, SkillCard, Status, Title};
use meeting_ai::types::transcription::Entry;
use meeting_ai::Error as AiError;

use crate::error::{external_error, Error, ExternalErrorKind};

/// Title shown on processing and error status cards.
pub const STATUS_CARD_TITLE: &str = "Meeting Summary";
pub const PROCESSING_MESSAGE: &str =
    "We're transcribing and summarizing this recording. Check back in a few minutes.";

const SUMMARY_CARD_CODE: &str = "summary-card";
const SUMMARY_CARD_TITLE: &str = "Summary";
const TRANSCRIPT_CARD_CODE: &str = "transcript_card";
const TRANSCRIPT_CARD_TITLE: &str = "Transcript";

pub struct SkillCardPublisher {
    skills: Arc<dyn skills::Provider>,
    skill_id: String,
    invocation_id: String,
    file_id: String,
}

impl SkillCardPublisher {
    pub fn new(
        skills: Arc<dyn skills::Provider>,
        skill_id: &str,
        invocation_id: &str,
        file_id: &str,
    ) -> Self {
        Self {
            skills,
            skill_id: skill_id.to_string(),
            invocation_id: invocation_id.to_string(),
            file_id: file_id.to_string(),
        }
    }

    pub fn skills(&self) -> &Arc<dyn skills::Provider> {
        &self.skills
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Replace the file's cards with a `processing` status card.
    pub async fn send_processing_card(&self, title: &str, message: &str) -> Result<(), Error> {
        let card = SkillCard::status(
            &self.skill_id,
            &self.invocation_id,
            Title::from_message(title),
            Status::Processing,
            message,
        );
        self.update_invocation(card).await?;
        debug!("Sent processing card for invocation {}", self.invocation_id);
        Ok(())
    }

    /// Replace the file's cards with a `transient_failure` status card.
    ///
    /// The title code follows the same `skill_` rule as the processing card. The platform
    /// error code is appended to the status message. The invocation itself stays
    /// `processing` so the platform may re-invoke.
    pub async fn send_error_card(
        &self,
        title: &str,
        code: ErrorCode,
        message: &str,
    ) -> Result<(), Error> {
        let card = SkillCard::status(
            &self.skill_id,
            &self.invocation_id,
            Title::from_message(title),
            Status::TransientFailure,
            &error_status_message(code, message),
        );
        self.update_invocation(card).await?;
        info!(
            "Sent {} error card for invocation {}",
            code.as_str(),
            self.invocation_id
        );
        Ok(())
    }

    /// Attach a single-entry text card.
    pub async fn send_transcript_card(&self, title: &str, text: &str) -> Result<(), Error> {
        let card = SkillCard::transcript(
            &self.skill_id,
            &self.invocation_id,
            Title::from_message(title),
            vec![CardEntry::text(text)],
            None,
        );
        self.create_cards(vec![card]).await
    }

    /// Attach the summary card and the timed transcript card in one call.
    pub async fn send_results(
        &self,
        summary: &str,
        entries: Vec<Entry>,
        duration: Option<u64>,
    ) -> Result<(), Error> {
        let summary_card = SkillCard::transcript(
            &self.skill_id,
            &self.invocation_id,
            Title::with_code(SUMMARY_CARD_CODE, SUMMARY_CARD_TITLE),
            vec![CardEntry::text(summary.trim())],
            None,
        );
        let transcript_card = SkillCard::transcript(
            &self.skill_id,
            &self.invocation_id,
            Title::with_code(TRANSCRIPT_CARD_CODE, TRANSCRIPT_CARD_TITLE),
            entries.into_iter().map(CardEntry::from).collect(),
            duration,
        );
        self.create_cards(vec![summary_card, transcript_card]).await
    }

    /// Remove the status card (and any other skill cards) from the file.
    pub async fn delete_status_card(&self) -> Result<(), Error> {
        self.skills
            .delete_cards(&self.file_id)
            .await
            .map_err(|e| self.publish_error(e))
    }

    async fn update_invocation(&self, card: SkillCard) -> Result<(), Error> {
        let update = InvocationUpdate {
            file_id: self.file_id.clone(),
            status: Status::Processing,
            cards: vec![card],
        };
        self.skills
            .update_invocation(&self.skill_id, update)
            .await
            .map_err(|e| self.publish_error(e))
    }

    async fn create_cards(&self, cards: Vec<SkillCard>) -> Result<(), Error> {
        self.skills
            .create_cards(&self.file_id, cards)
            .await
            .map_err(|e| self.publish_error(e))
    }

    fn publish_error(&self, err: AiError) -> Error {
        warn!(
            "Skill card publishing failed for invocation {}: {}",
            self.invocation_id, err
        );
        external_error(ExternalErrorKind::SkillCardPublish, err)
    }
}

fn error_status_message(code: ErrorCode, message: &str) -> String {
    format!("{} ({})", message, code.as_str())
}
