use crate::{
    controller::{health_check_controller, webhook_controller},
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(skill_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Skill invocation deliveries. Authenticated by the delivery signature, not a session.
fn skill_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/skills/invoke", post(webhook_controller::skill_invocation))
        .with_state(app_state)
}
