//! Controller for skill invocations delivered by the collaboration platform.

use std::collections::HashMap;

use crate::{AppState, Error};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use domain::{InvocationOutcome, SkillInvocationEvent};
use log::*;
use serde::Serialize;

/// Response for webhook acknowledgment
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// POST /skills/invoke
///
/// Authenticates the delivery signature against the raw body, then runs the whole
/// pipeline before responding. Cards are posted to the source file as a side effect.
pub async fn skill_invocation(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    let headers = lowercase_headers(&headers);
    app_state.services.authenticate(&headers, &body)?;

    let event = SkillInvocationEvent::parse(&body)?;
    debug!(
        "Skill invocation {} for file {} ({})",
        event.id, event.source.id, event.source.name
    );

    let response = match app_state.services.process(&event).await? {
        InvocationOutcome::Published => WebhookResponse {
            status: "published".to_string(),
            error_code: None,
        },
        InvocationOutcome::Rejected(code) => WebhookResponse {
            status: "rejected".to_string(),
            error_code: Some(code.as_str().to_string()),
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Header values that are not visible ASCII are dropped; none of the signature headers
/// can contain them.
fn lowercase_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::define_routes;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use chrono::{SecondsFormat, Utc};
    use clap::Parser;
    use domain::skill_invocation::{SkillServices, SkillsConnector};
    use domain::summarizer::{SummarySettings, Summarizer};
    use domain::transcription_job::{PollPolicy, TranscriptionJobs, TranscriptionSettings};
    use meeting_ai::traits::skills::InvocationUpdate;
    use meeting_ai::traits::{analysis, skills, storage, transcription};
    use meeting_ai::types::skill_card::{Body as CardBody, SkillCard};
    use meeting_ai::types::summarization::Style;
    use meeting_ai::types::transcription::{Config as JobConfig, Job};
    use meeting_ai::Error as AiError;
    use meeting_auth::webhook::{sign, DualKeyWebhookValidator};
    use secrecy::SecretString;
    use service::config::Config;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    const PRIMARY_KEY: &str = "primary-key";
    const SECONDARY_KEY: &str = "secondary-key";

    /// Records card writes; every other collaborator refuses to be called.
    #[derive(Default)]
    struct RecordingSkills {
        updates: Mutex<Vec<InvocationUpdate>>,
    }

    #[async_trait]
    impl skills::Provider for RecordingSkills {
        async fn file_contents(&self, file_id: &str) -> std::result::Result<Vec<u8>, AiError> {
            Err(AiError::NotFound(file_id.to_string()))
        }

        async fn update_invocation(
            &self,
            _skill_id: &str,
            update: InvocationUpdate,
        ) -> std::result::Result<(), AiError> {
            self.updates.lock().unwrap().push(update);
            Ok(())
        }

        async fn create_cards(
            &self,
            _file_id: &str,
            _cards: Vec<SkillCard>,
        ) -> std::result::Result<(), AiError> {
            Ok(())
        }

        async fn delete_cards(&self, _file_id: &str) -> std::result::Result<(), AiError> {
            Ok(())
        }
    }

    struct FixedConnector(Arc<RecordingSkills>);

    impl SkillsConnector for FixedConnector {
        fn connect(
            &self,
            _event: &SkillInvocationEvent,
        ) -> std::result::Result<Arc<dyn skills::Provider>, domain::error::Error> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    #[async_trait]
    impl transcription::Provider for Offline {
        async fn start_job(&self, _config: JobConfig) -> std::result::Result<Job, AiError> {
            Err(AiError::Network("offline".to_string()))
        }

        async fn get_job(&self, _job_name: &str) -> std::result::Result<Job, AiError> {
            Err(AiError::Network("offline".to_string()))
        }

        fn provider_id(&self) -> &str {
            "offline"
        }
    }

    #[async_trait]
    impl analysis::Provider for Offline {
        async fn invoke_model(
            &self,
            _model_id: &str,
            _body: Vec<u8>,
        ) -> std::result::Result<Vec<u8>, AiError> {
            Err(AiError::Network("offline".to_string()))
        }

        fn provider_id(&self) -> &str {
            "offline"
        }
    }

    #[async_trait]
    impl storage::Provider for Offline {
        async fn put_object(
            &self,
            _bucket: &str,
            _key: &str,
            _body: Vec<u8>,
        ) -> std::result::Result<(), AiError> {
            Err(AiError::Network("offline".to_string()))
        }

        async fn get_object(
            &self,
            _bucket: &str,
            _key: &str,
        ) -> std::result::Result<Vec<u8>, AiError> {
            Err(AiError::Network("offline".to_string()))
        }
    }

    fn app(skills: Arc<RecordingSkills>) -> Router {
        let jobs = TranscriptionJobs::new(
            Arc::new(Offline),
            Arc::new(Offline),
            TranscriptionSettings {
                recordings_bucket: "recordings".to_string(),
                output_bucket: "transcripts".to_string(),
                output_prefix: "meetings_summary".to_string(),
                language_code: "en-US".to_string(),
                poll: PollPolicy {
                    initial: Duration::from_millis(1),
                    max_interval: Duration::from_millis(1),
                    max_wait: Duration::from_millis(10),
                },
            },
        );
        let summarizer = Summarizer::new(
            Arc::new(Offline),
            Arc::new(Offline),
            SummarySettings {
                model_id: "anthropic.claude-v2:1".to_string(),
                max_tokens: 150,
                style: Style::General,
                summary_bucket: "transcripts".to_string(),
            },
        );
        let services = SkillServices::from_parts(
            "client-123".to_string(),
            Box::new(DualKeyWebhookValidator::new(
                "box".to_string(),
                SecretString::new(PRIMARY_KEY.to_string()),
                SecretString::new(SECONDARY_KEY.to_string()),
            )),
            Box::new(FixedConnector(skills)),
            Arc::new(Offline),
            jobs,
            summarizer,
        );
        let config = Config::try_parse_from(["meeting_skills_rs"]).unwrap();
        define_routes(AppState::new(config, services))
    }

    fn event_body(file_name: &str) -> String {
        serde_json::json!({
            "type": "skill_invocation",
            "id": "inv-1",
            "skill": {"id": "skill-1", "api_key": "client-123"},
            "token": {
                "read": {"access_token": "read-token"},
                "write": {"access_token": "write-token"}
            },
            "source": {"type": "file", "id": "file-42", "name": file_name}
        })
        .to_string()
    }

    fn signed_request(body: &str, key: &str) -> Request<Body> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let signature = sign(key, body.as_bytes(), &timestamp).unwrap();
        Request::builder()
            .method("POST")
            .uri("/skills/invoke")
            .header("content-type", "application/json")
            .header("BOX-DELIVERY-TIMESTAMP", timestamp)
            .header("box-signature-version", "1")
            .header("box-signature-algorithm", "HmacSHA256")
            .header("box-signature-primary", signature)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(Arc::default()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_signature_is_unauthorized_without_cards() {
        let skills = Arc::new(RecordingSkills::default());
        let request = signed_request(&event_body("standup.mp4"), "not-a-configured-key");

        let response = app(skills.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(skills.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsigned_delivery_is_unauthorized() {
        let request = Request::builder()
            .method("POST")
            .uri("/skills/invoke")
            .body(Body::from(event_body("standup.mp4")))
            .unwrap();

        let response = app(Arc::default()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signed_garbage_is_bad_request() {
        let request = signed_request("{\"id\": 7}", PRIMARY_KEY);

        let response = app(Arc::default()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_file_is_acknowledged_with_error_code() {
        let skills = Arc::new(RecordingSkills::default());
        let request = signed_request(&event_body("agenda.pdf"), PRIMARY_KEY);

        let response = app(skills.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "status": "rejected",
                "error_code": "skills_invalid_file_format_error"
            })
        );
        assert_eq!(skills.updates.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_failure_maps_to_bad_gateway_after_error_card() {
        let skills = Arc::new(RecordingSkills::default());
        let request = signed_request(&event_body("standup.mp4"), PRIMARY_KEY);

        let response = app(skills.clone()).oneshot(request).await.unwrap();

        // The download fails with NotFound.
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let updates = skills.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        let card = &updates[1].cards[0];
        assert_eq!(card.skill_card_title.code, "skill_meeting_summary");
        assert!(matches!(
            &card.body,
            CardBody::Status { status } if status.message.ends_with("(skills_file_processing_error)")
        ));
    }
}
