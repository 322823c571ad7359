use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::admin::DashboardStats,
    dto::orders::UpdateOrderStatusRequest,
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    entity::products::Entity as Products,
    entity::users::Entity as Users,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    services::order_service::order_from_entity,
    state::AppState,
};

pub async fn list_all_orders(state: &AppState, user: &AuthUser) -> AppResult<Vec<Order>> {
    ensure_admin(user)?;
    let orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();
    Ok(orders)
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<Order> {
    ensure_admin(user)?;
    validate_order_status(&payload.status)?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    // Partial update: an absent tracking number leaves the stored one alone.
    if let Some(tracking) = payload.tracking_number {
        active.tracking_number = Set(Some(tracking));
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    Ok(order_from_entity(order))
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<DashboardStats> {
    ensure_admin(user)?;

    let total_users = Users::find().count(&state.orm).await?;
    let total_products = Products::find().count(&state.orm).await?;
    let total_orders = Orders::find().count(&state.orm).await?;

    let total_revenue: Option<Decimal> = Orders::find()
        .select_only()
        .column_as(OrderCol::Total.sum(), "revenue")
        .filter(OrderCol::PaymentStatus.eq("paid"))
        .into_tuple()
        .one(&state.orm)
        .await?
        .flatten();

    let recent_orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .limit(5)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(DashboardStats {
        total_users,
        total_products,
        total_orders,
        total_revenue: total_revenue.unwrap_or(Decimal::ZERO),
        recent_orders,
    })
}

fn validate_order_status(status: &str) -> Result<(), AppError> {
    const VALID: [&str; 6] = [
        "pending",
        "confirmed",
        "processing",
        "shipped",
        "delivered",
        "cancelled",
    ];
    if VALID.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid order status".into()))
    }
}
