use storefront_api::error::AppError;
use storefront_api::services::auth_service::{
    decode_token, hash_password, issue_token, verify_password,
};
use uuid::Uuid;

const SECRET: &str = "test-secret";

#[test]
fn token_round_trip_preserves_claims() {
    let user_id = Uuid::new_v4();
    let token = issue_token(user_id, "shopper@example.com", false, SECRET, 72).unwrap();

    let claims = decode_token(&token, SECRET).expect("token should validate");
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email, "shopper@example.com");
    assert!(!claims.is_admin);
}

#[test]
fn admin_claim_survives_round_trip() {
    let token = issue_token(Uuid::new_v4(), "admin@example.com", true, SECRET, 72).unwrap();
    let claims = decode_token(&token, SECRET).unwrap();
    assert!(claims.is_admin);
}

#[test]
fn expired_token_is_rejected_as_expired() {
    // Negative TTL puts the expiry well past the default leeway.
    let token = issue_token(Uuid::new_v4(), "shopper@example.com", false, SECRET, -1).unwrap();

    match decode_token(&token, SECRET) {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
        other => panic!("expected expired-token rejection, got {other:?}"),
    }
}

#[test]
fn token_signed_with_other_secret_is_rejected() {
    let token = issue_token(Uuid::new_v4(), "shopper@example.com", true, "other-secret", 72).unwrap();

    match decode_token(&token, SECRET) {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid token"),
        other => panic!("expected forged-token rejection, got {other:?}"),
    }
}

#[test]
fn garbage_token_is_rejected() {
    assert!(decode_token("not.a.token", SECRET).is_err());
}

#[test]
fn password_hash_verifies_and_rejects() {
    let hash = hash_password("hunter2").unwrap();
    assert_ne!(hash, "hunter2");
    assert!(verify_password("hunter2", &hash));
    assert!(!verify_password("hunter3", &hash));
    assert!(!verify_password("hunter2", "not-a-valid-hash"));
}
