//! Box skills API client.
//!
//! Every skill invocation carries its own short-lived read and write tokens, so a
//! client is built per invocation. Card writes are not retried; content downloads use
//! the default transient retry policy.

use async_trait::async_trait;
use log::*;
use meeting_ai::traits::skills::{InvocationUpdate, Provider};
use meeting_ai::types::skill_card::{SkillCard, Status};
use meeting_ai::Error as AiError;
use meeting_auth::api_key::BearerTokenAuth;
use meeting_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use secrecy::SecretString;
use serde::Serialize;

use crate::error::Error;

const PROVIDER_ID: &str = "box";
const SKILLS_METADATA_PATH: &str = "metadata/global/boxSkillsCards";

#[derive(Debug, Serialize)]
struct InvocationUpdateBody<'a> {
    status: Status,
    metadata: CardsBody<'a>,
    file: FileRef<'a>,
}

#[derive(Debug, Serialize)]
struct CardsBody<'a> {
    cards: &'a [SkillCard],
}

#[derive(Debug, Serialize)]
struct FileRef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
}

/// Box skills API client scoped to one invocation's tokens
pub struct BoxSkillsClient {
    read_client: AuthenticatedClient,
    write_client: AuthenticatedClient,
    base_url: String,
}

impl BoxSkillsClient {
    /// Create a client for the given invocation tokens.
    pub fn new(
        base_url: &str,
        read_token: SecretString,
        write_token: SecretString,
    ) -> Result<Self, Error> {
        let read_client = AuthenticatedClientBuilder::new()
            .with_auth(Box::new(BearerTokenAuth::new(PROVIDER_ID, read_token)))
            .build()?;

        let write_client = AuthenticatedClientBuilder::new()
            .with_auth(Box::new(BearerTokenAuth::new(PROVIDER_ID, write_token)))
            .with_max_retries(0)
            .build()?;

        Ok(Self {
            read_client,
            write_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn cards_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/{}", self.base_url, file_id, SKILLS_METADATA_PATH)
    }

    async fn send_json<T: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &T,
    ) -> Result<Response, AiError> {
        let payload = serde_json::to_vec(body)?;
        self.write_client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                warn!("Box request to {} failed: {:?}", url, e);
                AiError::Network(e.to_string())
            })
    }
}

/// Turn a non-success response into the matching provider error.
async fn check_status(response: Response, what: &str) -> Result<Response, AiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    error!("Box API {} returned {}: {}", what, status, error_text);
    Err(match status {
        StatusCode::NOT_FOUND => AiError::NotFound(format!("{what}: {error_text}")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AiError::Authentication(format!("{what}: {error_text}"))
        }
        _ => AiError::Provider(format!("{what} returned {status}: {error_text}")),
    })
}

#[async_trait]
impl Provider for BoxSkillsClient {
    async fn file_contents(&self, file_id: &str) -> Result<Vec<u8>, AiError> {
        let url = format!("{}/files/{}/content", self.base_url, file_id);
        debug!("Downloading Box file {}", file_id);

        let response = self.read_client.get(&url).send().await.map_err(|e| {
            warn!("Failed to download Box file {}: {:?}", file_id, e);
            AiError::Network(e.to_string())
        })?;
        let response = check_status(response, "file content").await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;
        info!("Downloaded {} bytes of Box file {}", bytes.len(), file_id);
        Ok(bytes.to_vec())
    }

    async fn update_invocation(
        &self,
        skill_id: &str,
        update: InvocationUpdate,
    ) -> Result<(), AiError> {
        let url = format!("{}/skill_invocations/{}", self.base_url, skill_id);
        let body = InvocationUpdateBody {
            status: update.status,
            metadata: CardsBody {
                cards: &update.cards,
            },
            file: FileRef {
                kind: "file",
                id: &update.file_id,
            },
        };

        let response = self.send_json(reqwest::Method::PUT, &url, &body).await?;
        check_status(response, "skill invocation update").await?;
        debug!("Updated skill invocation for file {}", update.file_id);
        Ok(())
    }

    async fn create_cards(&self, file_id: &str, cards: Vec<SkillCard>) -> Result<(), AiError> {
        let url = self.cards_url(file_id);
        let body = CardsBody { cards: &cards };

        let response = self.send_json(reqwest::Method::POST, &url, &body).await?;
        check_status(response, "create skill cards").await?;
        info!("Attached {} skill cards to file {}", cards.len(), file_id);
        Ok(())
    }

    async fn delete_cards(&self, file_id: &str) -> Result<(), AiError> {
        let url = self.cards_url(file_id);

        let response = self.write_client.delete(&url).send().await.map_err(|e| {
            warn!("Failed to delete skill cards on {}: {:?}", file_id, e);
            AiError::Network(e.to_string())
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No skill cards to delete on file {}", file_id);
            return Ok(());
        }
        check_status(response, "delete skill cards").await?;
        Ok(())
    }
}
