use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::error::MediaError;
use super::traits::MediaStore;
use super::validate_key;

/// S3-compatible media store (AWS S3, MinIO, R2).
///
/// Objects are served straight from the bucket (or a CDN in front of it), so
/// `public_base_url` must point at a publicly readable location for the bucket.
pub struct S3MediaStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3MediaStore {
    /// Create a new S3 media store.
    ///
    /// A custom `endpoint` selects path-style addressing for S3-compatible
    /// services; without one the region string is resolved to an AWS region.
    pub fn new(
        bucket_name: &str,
        region: &str,
        endpoint: Option<&str>,
        access_key: &str,
        secret_key: &str,
        public_base_url: String,
    ) -> Result<Self, MediaError> {
        let path_style = endpoint.is_some();
        let region = match endpoint {
            Some(endpoint) => Region::Custom {
                region: region.to_string(),
                endpoint: endpoint.to_string(),
            },
            None => region
                .parse()
                .map_err(|e| MediaError::Backend(format!("invalid region {region:?}: {e}")))?,
        };

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| MediaError::Backend(e.to_string()))?;

        let mut bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| MediaError::Backend(e.to_string()))?;
        if path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, MediaError> {
        validate_key(key)?;

        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| MediaError::Backend(e.to_string()))?;

        if response.status_code() != 200 {
            return Err(MediaError::Backend(format!(
                "put {key:?} returned status {}",
                response.status_code()
            )));
        }

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
