pub mod aws_transcribe;
pub mod bedrock;
pub mod box_skills;
pub mod s3;
