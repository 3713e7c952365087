pub mod analysis;
pub mod skills;
pub mod storage;
pub mod transcription;
