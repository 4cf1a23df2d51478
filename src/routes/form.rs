use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::error::{AppError, AppResult};
use crate::upstream::ImageStore;

/// A file part from a multipart body.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Text fields plus at most one `image` file from a multipart body.
#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    image: Option<UploadedFile>,
}

/// A body cut off by the route's `DefaultBodyLimit` is a 413, anything else
/// is a malformed form.
fn form_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(format!("{context}: {}", err.body_text()))
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        FormData::read(multipart).await
    }
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| form_error(e, "Invalid form data"))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);

            match filename {
                Some(filename) if name == "image" => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| form_error(e, "Invalid image"))?;
                    // Browsers send an empty part when no file was picked
                    if !bytes.is_empty() {
                        form.image = Some(UploadedFile { filename, bytes });
                    }
                }
                _ => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| form_error(e, &format!("Invalid field {name}")))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Non-blank text value of a field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| AppError::BadRequest(format!("{name} is not a valid value")))
            })
            .transpose()
    }

    pub fn take_image(&mut self) -> Option<UploadedFile> {
        self.image.take()
    }
}

/// Push the file to the image store and return its URL.
pub async fn upload(images: &dyn ImageStore, file: UploadedFile) -> AppResult<String> {
    let url = images.upload(&file.filename, file.bytes).await?;
    tracing::info!("Uploaded image {} -> {}", file.filename, url);
    Ok(url)
}
