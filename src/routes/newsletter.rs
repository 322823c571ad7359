use axum::{Json, extract::State};

use crate::{
    dto::newsletter::SubscribeRequest,
    error::AppResult,
    response::MessageResponse,
    services::newsletter_service,
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed (idempotent)", body = MessageResponse),
        (status = 400, description = "Invalid email"),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = newsletter_service::subscribe(&state, payload).await?;
    Ok(Json(resp))
}
