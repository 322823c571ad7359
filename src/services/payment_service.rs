use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::{
    dto::checkout::{CheckoutStatusResponse, CreateSessionRequest, CreateSessionResponse},
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    entity::payment_transactions::{
        ActiveModel as TxActive, Column as TxCol, Entity as PaymentTransactions,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    payments::SessionRequest,
    state::AppState,
};

/// Opens a hosted checkout session for an order owned by the caller and
/// records the matching PaymentTransaction ("initiated").
pub async fn create_session(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSessionRequest,
) -> AppResult<CreateSessionResponse> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(payload.order_id))
                .add(OrderCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    if order.payment_status == "paid" {
        return Err(AppError::Conflict("Order already paid".into()));
    }

    let host_url = payload.host_url.trim_end_matches('/');
    let session = state
        .checkout
        .create_session(SessionRequest {
            amount: order.total,
            currency: state.config.checkout_currency.clone(),
            success_url: format!("{host_url}/order-success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{host_url}/checkout"),
            order_id: order.id,
            user_id: user.user_id,
        })
        .await?;

    TxActive {
        id: Set(uuid::Uuid::new_v4()),
        session_id: Set(session.session_id.clone()),
        order_id: Set(order.id),
        user_id: Set(user.user_id),
        amount: Set(order.total),
        currency: Set(state.config.checkout_currency.clone()),
        payment_status: Set("initiated".into()),
        metadata: Set(Some(serde_json::json!({ "order_id": order.id }))),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let session_id = session.session_id;
    let mut active: OrderActive = order.into();
    active.payment_session_id = Set(Some(session_id.clone()));
    active.update(&state.orm).await?;

    Ok(CreateSessionResponse {
        url: session.url,
        session_id,
    })
}

/// Client-driven poll. Applies the paid transition when the provider reports
/// it; always echoes the provider's raw status fields.
pub async fn poll_status(
    state: &AppState,
    _user: &AuthUser,
    session_id: &str,
) -> AppResult<CheckoutStatusResponse> {
    let status = state.checkout.session_status(session_id).await?;

    let tx = PaymentTransactions::find()
        .filter(TxCol::SessionId.eq(session_id))
        .one(&state.orm)
        .await?;
    if tx.is_none() {
        return Err(AppError::NotFound("Payment transaction"));
    }

    if status.payment_status == "paid" {
        apply_paid(&state.orm, session_id).await?;
    }

    Ok(CheckoutStatusResponse {
        status: status.status,
        payment_status: status.payment_status,
        amount_total: status.amount_total,
        currency: status.currency,
    })
}

/// Server-to-server trigger; the verified signature is the sole authorization.
pub async fn handle_webhook(
    state: &AppState,
    body: &[u8],
    signature_header: &str,
) -> AppResult<()> {
    let event = state.checkout.parse_webhook(body, signature_header)?;

    if event.payment_status == "paid" {
        if let Some(session_id) = event.session_id.as_deref() {
            match apply_paid(&state.orm, session_id).await {
                Ok(_) => {}
                // The provider may deliver events for sessions this service
                // never opened; acknowledge them rather than forcing retries.
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(session_id, "webhook for unknown session");
                }
                Err(err) => return Err(err),
            }
        }
    }

    Ok(())
}

/// The single idempotent paid transition shared by poll and webhook.
///
/// A compare-and-set on the transaction row decides the winner when the two
/// triggers race; the order half is guarded by its own `!= paid` filter, so a
/// crash between the two writes is repaired by the next observer and a fully
/// settled session produces zero writes. Returns whether the transaction row
/// transitioned.
pub async fn apply_paid(orm: &DatabaseConnection, session_id: &str) -> AppResult<bool> {
    let tx = PaymentTransactions::find()
        .filter(TxCol::SessionId.eq(session_id))
        .one(orm)
        .await?
        .ok_or(AppError::NotFound("Payment transaction"))?;

    let result = PaymentTransactions::update_many()
        .col_expr(TxCol::PaymentStatus, Expr::value("paid"))
        .col_expr(TxCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(TxCol::SessionId.eq(session_id))
        .filter(TxCol::PaymentStatus.ne("paid"))
        .exec(orm)
        .await?;
    let transitioned = result.rows_affected > 0;

    Orders::update_many()
        .col_expr(OrderCol::PaymentStatus, Expr::value("paid"))
        .col_expr(OrderCol::Status, Expr::value("confirmed"))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::Id.eq(tx.order_id))
        .filter(OrderCol::PaymentStatus.ne("paid"))
        .exec(orm)
        .await?;

    Ok(transitioned)
}
