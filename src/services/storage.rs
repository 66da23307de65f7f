use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File is empty")]
    EmptyFile,

    #[error("Upload failed: {0}")]
    UploadRejected(StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Remote object storage seam: upload raw bytes to a path, get back the
/// public URL of the stored object.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError>;
}

/// Supabase storage client. Objects are PUT to
/// `{url}/storage/v1/object/{bucket}/{path}` with the service role key as
/// bearer token; a 2xx response means the object is readable at the public
/// URL.
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(&crate::config::config().storage)
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        let response = self
            .client
            .put(self.upload_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::UploadRejected(response.status()));
        }

        debug!("Uploaded object to {}", path);
        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SupabaseStorage {
        SupabaseStorage::new(&StorageConfig {
            url: "https://project.supabase.co/".to_string(),
            service_key: "service-key".to_string(),
            bucket: "policy-documents".to_string(),
        })
    }

    #[test]
    fn upload_url_targets_the_object_endpoint() {
        assert_eq!(
            storage().upload_url("policies/7/contract_1.pdf"),
            "https://project.supabase.co/storage/v1/object/policy-documents/policies/7/contract_1.pdf"
        );
    }

    #[test]
    fn public_url_is_derived_from_the_path() {
        assert_eq!(
            storage().public_url("policies/7/contract_1.pdf"),
            "https://project.supabase.co/storage/v1/object/public/policy-documents/policies/7/contract_1.pdf"
        );
    }

    #[tokio::test]
    async fn empty_files_are_rejected_before_any_request() {
        let result = storage().upload("policies/1/contract_1.pdf", Vec::new()).await;
        assert!(matches!(result, Err(StorageError::EmptyFile)));
    }
}
