use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;
use sha2::Sha256;

use super::{
    CheckoutProvider, CheckoutSession, ProviderError, SessionRequest, SessionStatus, WebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

const API_BASE: &str = "https://api.stripe.com";

/// Webhook timestamps older than this are rejected to limit replays.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub struct StripeCheckout {
    http: reqwest::Client,
    api_key: String,
    webhook_secret: String,
    api_base: String,
}

impl StripeCheckout {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base: API_BASE.to_string(),
        }
    }

    /// Point the client at a different endpoint (stripe-mock, test server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn verify_signature(&self, body: &[u8], header: &str) -> Result<(), ProviderError> {
        let mut timestamp: Option<&str> = None;
        let mut candidates: Vec<&str> = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .and_then(|t| t.parse::<i64>().ok())
            .ok_or_else(|| ProviderError::Signature("missing timestamp".into()))?;

        let age = chrono::Utc::now().timestamp() - timestamp;
        if age > SIGNATURE_TOLERANCE_SECS {
            return Err(ProviderError::Signature("timestamp outside tolerance".into()));
        }

        if candidates.is_empty() {
            return Err(ProviderError::Signature("missing v1 signature".into()));
        }

        let mut signed_payload = format!("{timestamp}.").into_bytes();
        signed_payload.extend_from_slice(body);

        for candidate in candidates {
            let Ok(decoded) = hex::decode(candidate) else {
                continue;
            };
            let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
                .map_err(|e| ProviderError::Signature(e.to_string()))?;
            mac.update(&signed_payload);
            if mac.verify_slice(&decoded).is_ok() {
                return Ok(());
            }
        }

        Err(ProviderError::Signature("no matching signature".into()))
    }
}

fn to_minor_units(amount: Decimal) -> Result<i64, ProviderError> {
    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| ProviderError::Malformed("amount out of range".into()))
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    id: String,
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: SessionPayload,
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(&self, req: SessionRequest) -> Result<CheckoutSession, ProviderError> {
        let unit_amount = to_minor_units(req.amount)?;
        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".into()),
            ("success_url", req.success_url),
            ("cancel_url", req.cancel_url),
            ("line_items[0][price_data][currency]", req.currency),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Order {}", req.order_id),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                unit_amount.to_string(),
            ),
            ("line_items[0][quantity]", "1".into()),
            ("metadata[order_id]", req.order_id.to_string()),
            ("metadata[user_id]", req.user_id.to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.api_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "create session returned {status}: {body}"
            )));
        }

        let session: SessionPayload = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| ProviderError::Malformed("session has no redirect url".into()))?;

        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ProviderError> {
        let response = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{session_id}",
                self.api_base
            ))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::Request(format!(
                "status lookup returned {status}"
            )));
        }

        let session: SessionPayload = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(SessionStatus {
            status: session.status.unwrap_or_default(),
            payment_status: session.payment_status.unwrap_or_default(),
            amount_total: session.amount_total.unwrap_or_default(),
            currency: session.currency.unwrap_or_default(),
        })
    }

    fn parse_webhook(
        &self,
        body: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, ProviderError> {
        self.verify_signature(body, signature_header)?;

        let event: EventPayload =
            serde_json::from_slice(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        // Only completed-checkout events carry a payment state we act on.
        let payment_status = if event.event_type == "checkout.session.completed" {
            event.data.object.payment_status.unwrap_or_default()
        } else {
            String::new()
        };

        Ok(WebhookEvent {
            session_id: Some(event.data.object.id),
            payment_status,
        })
    }
}
