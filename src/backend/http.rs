//! HTTP client for the annotation server.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;

use super::{AnnotationBackend, BackendError, RandomImage};
use crate::constants::api;
use crate::model::AnnotationRecord;

/// `{hash}` body of a successful upload.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    hash: Option<String>,
}

/// `{error}` body the server sends with failures.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// [`AnnotationBackend`] talking to a server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        log::debug!("HTTP backend at {}", base_url);
        Ok(Self { client, base_url })
    }

    /// Server base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Pass 2xx responses through, turn everything else into [`BackendError::Status`].
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // The error body is optional; an unreadable one just means no message
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorResponse>(&body).ok())
        .map(|body| body.error);
    log::warn!("Request failed with HTTP {}: {:?}", status.as_u16(), message);
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

impl AnnotationBackend for HttpBackend {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, BackendError> {
        log::info!("Uploading {} ({} bytes)", filename, bytes.len());
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part(api::UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.url(api::UPLOAD))
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: UploadResponse = serde_json::from_slice(&response.bytes().await?)?;
        match body.hash {
            Some(hash) if !hash.is_empty() => Ok(hash),
            _ => Err(BackendError::MissingHash),
        }
    }

    async fn fetch_image(&self, hash: &str) -> Result<Vec<u8>, BackendError> {
        let response = self.client.get(self.url(&api::image_url(hash))).send().await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn random_image(&self) -> Result<RandomImage, BackendError> {
        let response = self.client.get(self.url(api::RANDOM_IMAGE)).send().await?;
        let response = check_status(response).await?;

        let hash = response
            .headers()
            .get(api::IMAGE_HASH_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        if hash.is_none() {
            log::debug!("Random image response without {} header", api::IMAGE_HASH_HEADER);
        }

        let bytes = response.bytes().await?.to_vec();
        Ok(RandomImage { bytes, hash })
    }

    async fn load_annotation(&self, hash: &str) -> Result<Option<AnnotationRecord>, BackendError> {
        let url = self.url(&format!("{}{}", api::ANNOTATION_PREFIX, hash));
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            log::debug!(
                "No annotation for {} (HTTP {})",
                hash,
                response.status().as_u16()
            );
            return Ok(None);
        }
        let record = serde_json::from_slice(&response.bytes().await?)?;
        Ok(Some(record))
    }

    async fn save_annotation(&self, record: &AnnotationRecord) -> Result<(), BackendError> {
        let body = record.to_json()?;
        let response = self
            .client
            .post(self.url(api::SAVE))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        check_status(response).await?;
        log::info!("Saved annotation for {}", record.image_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:5000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(
            backend.url(api::RANDOM_IMAGE),
            "http://localhost:5000/api/random-image"
        );
    }

    #[test]
    fn test_upload_response_parsing() {
        let ok: UploadResponse = serde_json::from_str(r#"{"hash": "abc"}"#).unwrap();
        assert_eq!(ok.hash.as_deref(), Some("abc"));
        let missing: UploadResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.hash.is_none());
        let err: ErrorResponse = serde_json::from_str(r#"{"error": "No file"}"#).unwrap();
        assert_eq!(err.error, "No file");
    }
}
