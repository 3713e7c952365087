//! Skill invocation pipeline for meeting recordings.
//!
//! The gateways in [`gateway`] implement the `meeting-ai` provider traits against AWS and
//! the collaboration platform. The remaining modules orchestrate them: transcription jobs,
//! transcript segmentation, summarization and skill card publishing, tied together per
//! invocation by [`skill_invocation::SkillServices`].

pub mod error;
pub mod gateway;
pub mod skill_cards;
pub mod skill_invocation;
pub mod summarizer;
pub mod transcript_segment;
pub mod transcription_job;

pub use skill_invocation::{InvocationOutcome, SkillInvocationEvent, SkillServices};
