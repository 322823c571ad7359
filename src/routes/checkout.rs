use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};

use crate::{
    dto::checkout::{
        CheckoutStatusResponse, CreateSessionRequest, CreateSessionResponse, WebhookAck,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-session", post(create_session))
        .route("/status/{session_id}", get(checkout_status))
}

#[utoipa::path(
    post,
    path = "/api/checkout/create-session",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Hosted checkout session", body = CreateSessionResponse),
        (status = 400, description = "Order already paid"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Checkout provider error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn create_session(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSessionRequest>,
) -> AppResult<Json<CreateSessionResponse>> {
    let resp = payment_service::create_session(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/checkout/status/{session_id}",
    params(
        ("session_id" = String, Path, description = "Checkout session ID")
    ),
    responses(
        (status = 200, description = "Provider session status", body = CheckoutStatusResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Payment transaction not found"),
        (status = 502, description = "Checkout provider error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<CheckoutStatusResponse>> {
    let resp = payment_service::poll_status(&state, &user, &session_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/webhook/stripe",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Webhook processed", body = WebhookAck),
        (status = 400, description = "Invalid webhook signature"),
    ),
    tag = "Checkout"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidWebhookSignature)?;

    payment_service::handle_webhook(&state, &body, signature).await?;

    Ok(Json(WebhookAck {
        status: "success".into(),
    }))
}
