//! Payment-intent creation.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::ProviderError;

/// A created payment intent; the client secret completes payment
/// out-of-band in the caller's UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Payment provider seam. Amounts are integer minor currency units.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_minor: u64,
        currency: &str,
        metadata: &[(String, String)],
    ) -> Result<PaymentIntent, ProviderError>;
}

/// Stripe-style form-encoded payment-intent client.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeGateway {
    pub fn new(secret_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            base_url: base_url.unwrap_or_else(|| "https://api.stripe.com".to_string()),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        amount_minor: u64,
        currency: &str,
        metadata: &[(String, String)],
    ) -> Result<PaymentIntent, ProviderError> {
        let mut params: Vec<(String, String)> = vec![
            ("amount".to_string(), amount_minor.to_string()),
            ("currency".to_string(), currency.to_string()),
        ];
        for (key, value) in metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http(format!("status {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let id = body["id"]
            .as_str()
            .ok_or_else(|| ProviderError::Malformed("missing intent id".to_string()))?;
        let client_secret = body["client_secret"]
            .as_str()
            .ok_or_else(|| ProviderError::Malformed("missing client_secret".to_string()))?;

        Ok(PaymentIntent {
            id: id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }
}

/// Test double recording requested intents.
#[derive(Debug, Default)]
pub struct FakePaymentGateway {
    requests: Mutex<Vec<(u64, String)>>,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<(u64, String)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_payment_intent(
        &self,
        amount_minor: u64,
        currency: &str,
        _metadata: &[(String, String)],
    ) -> Result<PaymentIntent, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((amount_minor, currency.to_string()));
        }
        Ok(PaymentIntent {
            id: format!("pi_test_{amount_minor}"),
            client_secret: format!("pi_test_{amount_minor}_secret"),
        })
    }
}
