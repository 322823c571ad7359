use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

pub mod stripe;

pub use stripe::StripeCheckout;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("webhook signature rejected: {0}")]
    Signature(String),

    #[error("malformed provider payload: {0}")]
    Malformed(String),

    #[error("provider request failed: {0}")]
    Request(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Signature(_) => AppError::InvalidWebhookSignature,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub amount: Decimal,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub order_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub status: String,
    pub payment_status: String,
    pub amount_total: i64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub session_id: Option<String>,
    pub payment_status: String,
}

/// Hosted-checkout provider seam. The service only ever opens a session,
/// asks for its status, or verifies a signed webhook payload.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(&self, req: SessionRequest) -> Result<CheckoutSession, ProviderError>;

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ProviderError>;

    /// Verify `signature_header` over `body` and parse the event. The
    /// signature is the sole authorization on the webhook path.
    fn parse_webhook(
        &self,
        body: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, ProviderError>;
}
