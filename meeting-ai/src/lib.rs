//! Meeting AI abstraction layer for transcription, summarization, storage, and skill providers.
//!
//! This crate provides trait-based abstractions for the meeting summary workflow:
//! - Speech-to-text transcription jobs and their timed token output
//! - Hosted generative-model invocation across several request/response conventions
//! - Object storage for recordings, transcripts, and generated summaries
//! - Skill-card publication on the collaboration platform
//!
//! The design is provider-agnostic: the `domain` crate supplies the AWS and Box
//! implementations, and tests substitute in-memory fakes.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::skill_card::SkillCard;
