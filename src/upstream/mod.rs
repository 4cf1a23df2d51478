//! Outbound collaborators: the image store and the payment processor.
//!
//! Both sit behind traits so handlers and tests never talk HTTP directly.

pub mod images;
pub mod payments;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::error::AppError;

pub use images::HttpImageStore;
pub use payments::HttpPaymentProcessor;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image store rejected upload: {0}")]
    Rejected(String),

    #[error("image store is not configured")]
    NotConfigured,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment processor rejected request: {0}")]
    Rejected(String),

    #[error("payment processor is not configured")]
    NotConfigured,
}

impl From<ImageStoreError> for AppError {
    fn from(err: ImageStoreError) -> Self {
        AppError::Upstream(format!("Image upload failed: {err}"))
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        AppError::Upstream(format!("Payment initiation failed: {err}"))
    }
}

/// Accepts an uploaded image and returns a stable public URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Bytes) -> Result<String, ImageStoreError>;
}

/// Creates payment intents and returns the client-side confirmation secret.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// `amount` is in minor units of `currency`.
    async fn create_intent(&self, amount: i64, currency: &str) -> Result<String, PaymentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn collaborator_errors_become_bad_gateway() {
        let image: AppError = ImageStoreError::Rejected("too large".into()).into();
        assert!(matches!(image, AppError::Upstream(ref m) if m.contains("too large")));
        assert_eq!(image.into_response().status(), StatusCode::BAD_GATEWAY);

        let payment: AppError = PaymentError::NotConfigured.into();
        assert_eq!(payment.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
