use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::newsletter::SubscribeRequest,
    entity::newsletter::{
        ActiveModel as SubscriberActive, Column as SubscriberCol, Entity as Newsletter,
        Model as SubscriberModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::NewsletterSubscriber,
    response::MessageResponse,
    state::AppState,
};

/// Idempotent by email: a repeat subscribe acknowledges without inserting.
pub async fn subscribe(state: &AppState, payload: SubscribeRequest) -> AppResult<MessageResponse> {
    if !payload.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }

    let existing = Newsletter::find()
        .filter(SubscriberCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Ok(MessageResponse::new("Already subscribed"));
    }

    SubscriberActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        subscribed_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(MessageResponse::new("Subscribed successfully"))
}

pub async fn list_subscribers(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<Vec<NewsletterSubscriber>> {
    ensure_admin(user)?;
    let subscribers = Newsletter::find()
        .order_by_desc(SubscriberCol::SubscribedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(subscriber_from_entity)
        .collect();
    Ok(subscribers)
}

fn subscriber_from_entity(model: SubscriberModel) -> NewsletterSubscriber {
    NewsletterSubscriber {
        id: model.id,
        email: model.email,
        subscribed_at: model.subscribed_at.with_timezone(&Utc),
    }
}
