use std::sync::Arc;

use domain::SkillServices;
use log::*;
use service::config::Config;
use tokio::net::TcpListener;

mod controller;
mod error;
pub mod router;

pub use error::{Error, Result};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub services: Arc<SkillServices>,
}

impl AppState {
    pub fn new(app_config: Config, services: SkillServices) -> Self {
        Self {
            config: app_config,
            services: Arc::new(services),
        }
    }
}

/// Bind the configured interface and serve skill invocations until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", interface, app_state.config.port);

    let listener = TcpListener::bind(&server_url).await?;
    info!(
        "Server starting on {} ({} environment)",
        server_url,
        app_state.config.runtime_env()
    );

    axum::serve(listener, router::define_routes(app_state)).await
}
