use aws_config::{BehaviorVersion, Region, SdkConfig};
use config::Config;
use log::info;

pub mod config;
pub mod logging;

/// Load the shared AWS configuration used by the transcription, model and storage clients.
///
/// Credentials come from the standard provider chain. The region comes from the
/// configuration when set and from the provider chain otherwise.
pub async fn init_aws(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.aws_region() {
        loader = loader.region(Region::new(region));
    }

    let sdk_config = loader.load().await;
    info!(
        "AWS config loaded: region={}",
        sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| "<unset>".to_string())
    );
    sdk_config
}
