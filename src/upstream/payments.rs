use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{PaymentError, PaymentProcessor};
use crate::config::PaymentConfig;

#[derive(Deserialize)]
struct IntentResponse {
    client_secret: Option<String>,
    error: Option<IntentFailure>,
}

#[derive(Deserialize)]
struct IntentFailure {
    message: Option<String>,
}

/// Talks to a Stripe-compatible `payment_intents` endpoint.
pub struct HttpPaymentProcessor {
    client: Client,
    endpoint: String,
    secret_key: String,
}

impl HttpPaymentProcessor {
    pub fn new(config: &PaymentConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            secret_key: config.secret_key.clone(),
        })
    }
}

#[async_trait]
impl PaymentProcessor for HttpPaymentProcessor {
    async fn create_intent(&self, amount: i64, currency: &str) -> Result<String, PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let amount = amount.to_string();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", currency),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: IntentResponse = response.json().await?;

        if !status.is_success() {
            let message = body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(PaymentError::Rejected(message));
        }

        body.client_secret
            .ok_or_else(|| PaymentError::Rejected("response carried no client secret".into()))
    }
}
