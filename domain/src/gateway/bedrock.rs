//! Amazon Bedrock runtime client for foundation model invocation.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use log::*;
use meeting_ai::traits::analysis::Provider;
use meeting_ai::Error as AiError;

/// Amazon Bedrock runtime client
pub struct BedrockClient {
    client: Client,
}

impl BedrockClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Provider for BedrockClient {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, AiError> {
        debug!("Invoking model {} with {} byte request", model_id, body.len());

        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("*/*")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                warn!(
                    "Failed to invoke model {}: {}",
                    model_id,
                    DisplayErrorContext(&e)
                );
                map_error(aws_sdk_bedrockruntime::Error::from(e))
            })?;

        Ok(output.body().as_ref().to_vec())
    }

    fn provider_id(&self) -> &str {
        "bedrock"
    }
}

fn map_error(err: aws_sdk_bedrockruntime::Error) -> AiError {
    match err {
        aws_sdk_bedrockruntime::Error::ResourceNotFoundException(e) => {
            AiError::NotFound(e.to_string())
        }
        aws_sdk_bedrockruntime::Error::AccessDeniedException(e) => {
            AiError::Authentication(e.to_string())
        }
        aws_sdk_bedrockruntime::Error::ValidationException(e) => {
            AiError::Configuration(e.to_string())
        }
        aws_sdk_bedrockruntime::Error::ModelTimeoutException(e) => AiError::Timeout(e.to_string()),
        other => AiError::Provider(DisplayErrorContext(&other).to_string()),
    }
}
