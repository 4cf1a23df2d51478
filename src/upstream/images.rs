use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::{ImageStore, ImageStoreError};
use crate::config::ImageStoreConfig;

#[derive(Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
    error: Option<UploadFailure>,
}

#[derive(Deserialize)]
struct UploadData {
    display_url: Option<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct UploadFailure {
    message: String,
}

/// Uploads to an imgbb-compatible endpoint (`POST ?key=<api key>` with a
/// multipart `image` field).
pub struct HttpImageStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpImageStore {
    pub fn new(config: &ImageStoreConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, filename: &str, bytes: Bytes) -> Result<String, ImageStoreError> {
        if self.api_key.is_empty() {
            return Err(ImageStoreError::NotConfigured);
        }

        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime.essence_str())?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body: UploadResponse = response.json().await?;

        if !status.is_success() {
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ImageStoreError::Rejected(message));
        }

        body.data
            .and_then(|data| data.display_url.or(data.url))
            .ok_or_else(|| ImageStoreError::Rejected("response carried no image url".into()))
    }
}
