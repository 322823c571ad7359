use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::orders::CreateOrderRequest,
    entity::orders::{
        ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        OrderItems,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Order,
    state::AppState,
};

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<Order> {
    if payload.items.is_empty() {
        return Err(AppError::Validation("Order must contain items".into()));
    }
    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::Validation("Item quantity must be positive".into()));
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::Validation("Item price must not be negative".into()));
        }
    }

    // Frozen at creation: no repricing against the catalog and no stock
    // check or decrement happens here.
    let total: Decimal = payload
        .items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        items: Set(OrderItems(payload.items)),
        total: Set(total),
        status: Set("pending".into()),
        payment_status: Set("pending".into()),
        payment_session_id: Set(None),
        shipping_address: Set(payload.shipping_address),
        tracking_number: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(order_from_entity(order))
}

pub async fn list_own(state: &AppState, user: &AuthUser) -> AppResult<Vec<Order>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();
    Ok(orders)
}

pub async fn get_own(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Order> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(id))
                .add(OrderCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    Ok(order_from_entity(order))
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        items: model.items.0,
        total: model.total,
        status: model.status,
        payment_status: model.payment_status,
        payment_session_id: model.payment_session_id,
        shipping_address: model.shipping_address,
        tracking_number: model.tracking_number,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
