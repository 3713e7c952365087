use domain::SkillServices;
use log::{error, info};
use service::{config::Config, logging::Logger};
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    let missing = config.missing_settings();
    if !missing.is_empty() {
        error!("Missing required settings: {}", missing.join(", "));
        std::process::exit(1);
    }

    info!("Starting meeting skills service...");

    let sdk_config = service::init_aws(&config).await;
    let services = match SkillServices::new(&config, &sdk_config) {
        Ok(services) => services,
        Err(e) => {
            error!("Failed to initialize skill services: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(AppState::new(config, services)).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}
