use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default Box content API base URL used when `BOX_API_BASE_URL` is not set.
pub const DEFAULT_BOX_API_BASE_URL: &str = "https://api.box.com/2.0";

/// Default foundation model used to summarize transcripts.
pub const DEFAULT_SUMMARY_MODEL_ID: &str = "anthropic.claude-v2:1";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Bucket that receives transcription output and generated summaries.
    #[arg(long, env)]
    transcribe_bucket: Option<String>,

    /// Bucket that downloaded recordings are copied into for transcription.
    #[arg(long, env)]
    storage_bucket: Option<String>,

    /// Client id of the Box skill application. Incoming events must carry it as their API key.
    #[arg(long, env)]
    box_client_id: Option<String>,

    /// Primary key used to sign skill event deliveries.
    #[arg(long, env)]
    box_key_1: Option<String>,

    /// Secondary key used to sign skill event deliveries.
    #[arg(long, env)]
    box_key_2: Option<String>,

    /// The base URL of the Box content API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_BOX_API_BASE_URL)]
    box_api_base_url: String,

    /// AWS region for the transcription, model and storage services. Falls back to the
    /// standard AWS provider chain when unset.
    #[arg(long, env)]
    aws_region: Option<String>,

    /// Foundation model used to generate summaries.
    #[arg(long, env, default_value = DEFAULT_SUMMARY_MODEL_ID)]
    summary_model_id: String,

    /// Token budget for a generated summary.
    #[arg(long, env, default_value_t = 150)]
    pub summary_max_tokens: u32,

    /// Which summary to ask for: general, three_sentences, per_speaker or follow_ups.
    #[arg(long, env, default_value = "general")]
    summary_style: String,

    /// Key prefix for transcription job output in the transcribe bucket.
    #[arg(long, env, default_value = "meetings_summary")]
    transcript_output_prefix: String,

    /// Language of the recordings.
    #[arg(long, env, default_value = "en-US")]
    transcription_language_code: String,

    /// Seconds to wait before the first transcription status check.
    #[arg(long, env, default_value_t = 5)]
    pub transcription_poll_initial_secs: u64,

    /// Upper bound in seconds between two transcription status checks.
    #[arg(long, env, default_value_t = 30)]
    pub transcription_poll_max_interval_secs: u64,

    /// Seconds after which a transcription that has not finished is abandoned.
    #[arg(long, env, default_value_t = 900)]
    pub transcription_max_wait_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Names of the required settings that are not configured.
    ///
    /// The service refuses to start while this is non-empty.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        [
            ("TRANSCRIBE_BUCKET", &self.transcribe_bucket),
            ("STORAGE_BUCKET", &self.storage_bucket),
            ("BOX_CLIENT_ID", &self.box_client_id),
            ("BOX_KEY_1", &self.box_key_1),
            ("BOX_KEY_2", &self.box_key_2),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn transcribe_bucket(&self) -> Option<String> {
        self.transcribe_bucket.clone()
    }

    pub fn storage_bucket(&self) -> Option<String> {
        self.storage_bucket.clone()
    }

    pub fn box_client_id(&self) -> Option<String> {
        self.box_client_id.clone()
    }

    pub fn box_key_1(&self) -> Option<String> {
        self.box_key_1.clone()
    }

    pub fn box_key_2(&self) -> Option<String> {
        self.box_key_2.clone()
    }

    /// Returns the Box content API base URL.
    pub fn box_api_base_url(&self) -> &str {
        &self.box_api_base_url
    }

    pub fn aws_region(&self) -> Option<String> {
        self.aws_region.clone()
    }

    pub fn summary_model_id(&self) -> &str {
        &self.summary_model_id
    }

    pub fn summary_style(&self) -> &str {
        &self.summary_style
    }

    pub fn transcript_output_prefix(&self) -> &str {
        &self.transcript_output_prefix
    }

    pub fn transcription_language_code(&self) -> &str {
        &self.transcription_language_code
    }

    pub fn transcription_poll_initial(&self) -> Duration {
        Duration::from_secs(self.transcription_poll_initial_secs)
    }

    pub fn transcription_poll_max_interval(&self) -> Duration {
        Duration::from_secs(self.transcription_poll_max_interval_secs)
    }

    pub fn transcription_max_wait(&self) -> Duration {
        Duration::from_secs(self.transcription_max_wait_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["meeting_skills_rs"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_all_required_settings_present() {
        let config = parse(&[
            "--transcribe-bucket",
            "summaries",
            "--storage-bucket",
            "recordings",
            "--box-client-id",
            "client",
            "--box-key-1",
            "k1",
            "--box-key-2",
            "k2",
        ]);
        assert!(config.missing_settings().is_empty());
        assert_eq!(config.transcribe_bucket().as_deref(), Some("summaries"));
        assert_eq!(config.storage_bucket().as_deref(), Some("recordings"));
    }

    #[test]
    fn test_missing_and_empty_settings_are_reported() {
        let config = parse(&["--transcribe-bucket", "summaries", "--box-key-1", ""]);
        let missing = config.missing_settings();
        assert!(missing.contains(&"BOX_KEY_1"));
        assert!(missing.contains(&"STORAGE_BUCKET"));
        assert!(!missing.contains(&"TRANSCRIBE_BUCKET"));
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.box_api_base_url(), DEFAULT_BOX_API_BASE_URL);
        assert_eq!(config.summary_model_id(), DEFAULT_SUMMARY_MODEL_ID);
        assert_eq!(config.summary_max_tokens, 150);
        assert_eq!(config.transcript_output_prefix(), "meetings_summary");
        assert_eq!(config.transcription_max_wait(), Duration::from_secs(900));
        assert_eq!(config.runtime_env(), RustEnv::Development);
    }

    #[test]
    fn test_rust_env_parses_case_insensitively() {
        assert_eq!("Production".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }
}
