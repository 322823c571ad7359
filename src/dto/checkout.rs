use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub order_id: Uuid,
    /// Base URL of the storefront; success/cancel URLs are derived from it.
    pub host_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSessionResponse {
    pub url: String,
    pub session_id: String,
}

/// Provider-reported session state, echoed to the poller as-is.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutStatusResponse {
    pub status: String,
    pub payment_status: String,
    pub amount_total: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub status: String,
}
