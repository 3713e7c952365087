use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Crates whose request-level chatter is hidden below `TRACE`.
const QUIET_CRATES: &[&str] = &[
    "aws_config",
    "aws_smithy_runtime",
    "aws_sdk_transcribe",
    "aws_sdk_bedrockruntime",
    "aws_sdk_s3",
    "hyper",
    "reqwest",
    "rustls",
    "axum",
];

pub struct Logger {}

impl Logger {
    /// Install the terminal logger at the configured level, stamping lines with RFC 3339 time.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        TermLogger::init(
            config.log_level_filter,
            Self::log_config(config.log_level_filter),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )
    }

    fn log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();
        for name in Self::quiet_crates(level) {
            builder.add_filter_ignore_str(name);
        }
        builder.build()
    }

    fn quiet_crates(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            QUIET_CRATES
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_and_http_crates_are_quiet_below_trace() {
        for level in [LevelFilter::Info, LevelFilter::Debug] {
            let quiet = Logger::quiet_crates(level);
            assert!(quiet.contains(&"aws_smithy_runtime"));
            assert!(quiet.contains(&"reqwest"));
        }
    }

    #[test]
    fn test_trace_shows_every_crate() {
        assert!(Logger::quiet_crates(LevelFilter::Trace).is_empty());
    }
}
