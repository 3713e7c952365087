//! Object storage provider trait.

use crate::Error;
use async_trait::async_trait;

/// Bucket + key object storage.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> std::result::Result<(), Error>;

    /// Read an object. A missing key is reported as [`Error::NotFound`] so callers can
    /// tell "not written yet" apart from other failures.
    async fn get_object(&self, bucket: &str, key: &str) -> std::result::Result<Vec<u8>, Error>;
}
