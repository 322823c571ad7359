use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, Set,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::products::{ProductPayload, ProductQuery},
    entity::products::{
        ActiveModel, Column, Entity as Products, Model as ProductModel, StringList,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    state::AppState,
};

pub async fn list_products(state: &AppState, query: ProductQuery) -> AppResult<Vec<Product>> {
    let mut condition = Condition::all();

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(Column::Name).ilike(pattern));
    }

    let products = Products::find()
        .filter(condition)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(products)
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<Product> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(product_from_entity(product))
}

pub async fn list_categories(state: &AppState) -> AppResult<Vec<String>> {
    let categories = Products::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .into_tuple::<String>()
        .all(&state.orm)
        .await?;
    Ok(categories)
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductPayload,
) -> AppResult<Product> {
    ensure_admin(user)?;
    validate_payload(&payload)?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category),
        images: Set(StringList(payload.images)),
        labels: Set(StringList(payload.labels)),
        benefits: Set(StringList(payload.benefits)),
        stock: Set(payload.stock),
        rating: Set(Decimal::ZERO),
        reviews_count: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product_from_entity(product))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProductPayload,
) -> AppResult<Product> {
    ensure_admin(user)?;
    validate_payload(&payload)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    // Full replace of the client-settable fields; rating and reviews_count
    // stay derived from the review set.
    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.description = Set(payload.description);
    active.price = Set(payload.price);
    active.category = Set(payload.category);
    active.images = Set(StringList(payload.images));
    active.labels = Set(StringList(payload.labels));
    active.benefits = Set(StringList(payload.benefits));
    active.stock = Set(payload.stock);

    let product = active.update(&state.orm).await?;

    Ok(product_from_entity(product))
}

pub async fn delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }
    Ok(())
}

fn validate_payload(payload: &ProductPayload) -> AppResult<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Product name must not be empty".into()));
    }
    if payload.price < Decimal::ZERO {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    if payload.stock < 0 {
        return Err(AppError::Validation("Stock must not be negative".into()));
    }
    Ok(())
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category: model.category,
        images: model.images.0,
        labels: model.labels.0,
        benefits: model.benefits.0,
        stock: model.stock,
        rating: model.rating,
        reviews_count: model.reviews_count,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
