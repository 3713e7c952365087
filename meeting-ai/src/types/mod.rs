pub mod skill_card;
pub mod summarization;
pub mod transcription;
