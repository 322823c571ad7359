use hmac::{Hmac, Mac};
use sha2::Sha256;
use storefront_api::payments::{CheckoutProvider, ProviderError, StripeCheckout};

type HmacSha256 = Hmac<Sha256>;

const WEBHOOK_SECRET: &str = "whsec_test123secret456";

fn test_client() -> StripeCheckout {
    StripeCheckout::new("sk_test_xxx", WEBHOOK_SECRET)
}

fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(signed_payload.as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

fn completed_event(session_id: &str, payment_status: &str) -> Vec<u8> {
    serde_json::json!({
        "type": "checkout.session.completed",
        "data": { "object": { "id": session_id, "payment_status": payment_status } }
    })
    .to_string()
    .into_bytes()
}

#[test]
fn valid_signature_parses_event() {
    let client = test_client();
    let payload = completed_event("cs_test_abc", "paid");
    let header = sign(&payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp());

    let event = client
        .parse_webhook(&payload, &header)
        .expect("valid signature should verify");
    assert_eq!(event.session_id.as_deref(), Some("cs_test_abc"));
    assert_eq!(event.payment_status, "paid");
}

#[test]
fn wrong_secret_is_rejected() {
    let client = test_client();
    let payload = completed_event("cs_test_abc", "paid");
    let header = sign(&payload, "wrong_secret", chrono::Utc::now().timestamp());

    match client.parse_webhook(&payload, &header) {
        Err(ProviderError::Signature(_)) => {}
        other => panic!("expected signature rejection, got {other:?}"),
    }
}

#[test]
fn modified_payload_is_rejected() {
    let client = test_client();
    let payload = completed_event("cs_test_abc", "paid");
    let header = sign(&payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp());

    let tampered = completed_event("cs_test_abc", "unpaid");
    assert!(matches!(
        client.parse_webhook(&tampered, &header),
        Err(ProviderError::Signature(_))
    ));
}

#[test]
fn stale_timestamp_is_rejected() {
    let client = test_client();
    let payload = completed_event("cs_test_abc", "paid");
    // 10 minutes old, beyond the 5-minute tolerance.
    let header = sign(&payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp() - 600);

    assert!(matches!(
        client.parse_webhook(&payload, &header),
        Err(ProviderError::Signature(_))
    ));
}

#[test]
fn header_without_timestamp_is_rejected() {
    let client = test_client();
    let payload = completed_event("cs_test_abc", "paid");

    assert!(matches!(
        client.parse_webhook(&payload, "v1=deadbeef"),
        Err(ProviderError::Signature(_))
    ));
}

#[test]
fn unrelated_event_type_has_no_payment_status() {
    let client = test_client();
    let payload = serde_json::json!({
        "type": "payment_intent.created",
        "data": { "object": { "id": "cs_test_abc", "payment_status": "paid" } }
    })
    .to_string()
    .into_bytes();
    let header = sign(&payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp());

    let event = client.parse_webhook(&payload, &header).unwrap();
    assert!(event.payment_status.is_empty());
}
