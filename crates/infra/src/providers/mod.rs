//! External provider clients (AI text generation, payments, QR rendering).
//!
//! Every call is attempted once per invocation; there are no retries at this
//! layer.

pub mod llm;
pub mod payment;
pub mod qr;

use thiserror::Error;

/// Failure talking to (or understanding) an external provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(String),

    #[error("provider response malformed: {0}")]
    Malformed(String),
}

pub use llm::{CannedTextGenerator, FailingTextGenerator, OpenAiChatClient, TextGenerator};
pub use payment::{FakePaymentGateway, PaymentGateway, PaymentIntent, StripeGateway};
pub use qr::qr_data_url;
