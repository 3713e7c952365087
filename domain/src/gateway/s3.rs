//! Amazon S3 object storage client.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use log::*;
use meeting_ai::traits::storage::Provider;
use meeting_ai::Error as AiError;

/// Amazon S3 client
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Provider for S3Store {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), AiError> {
        debug!("Writing {} bytes to s3://{}/{}", body.len(), bucket, key);

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                warn!(
                    "Failed to write s3://{}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&e)
                );
                AiError::Provider(DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, AiError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    debug!("s3://{}/{} does not exist yet", bucket, key);
                    AiError::NotFound(format!("s3://{bucket}/{key}"))
                } else {
                    warn!(
                        "Failed to read s3://{}/{}: {}",
                        bucket,
                        key,
                        DisplayErrorContext(&e)
                    );
                    AiError::Provider(DisplayErrorContext(&e).to_string())
                }
            })?;

        let data = output.body.collect().await.map_err(|e| {
            warn!("Failed to stream s3://{}/{}: {}", bucket, key, e);
            AiError::Network(e.to_string())
        })?;

        Ok(data.into_bytes().to_vec())
    }
}
