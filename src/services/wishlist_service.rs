use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    entity::products::{Column as ProdCol, Entity as Products},
    entity::users::{ActiveModel as UserActive, Entity as Users, Wishlist},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    services::product_service::product_from_entity,
    state::AppState,
};

/// Set-insert: adding a member twice leaves one entry. The product id is not
/// checked against the catalog; dangling ids are dropped at list time.
pub async fn add(state: &AppState, user: &AuthUser, product_id: Uuid) -> AppResult<()> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if existing.wishlist.0.contains(&product_id) {
        return Ok(());
    }

    let mut wishlist = existing.wishlist.0.clone();
    wishlist.push(product_id);

    let mut active: UserActive = existing.into();
    active.wishlist = Set(Wishlist(wishlist));
    active.update(&state.orm).await?;

    Ok(())
}

/// Removing a non-member is a no-op, not an error.
pub async fn remove(state: &AppState, user: &AuthUser, product_id: Uuid) -> AppResult<()> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if !existing.wishlist.0.contains(&product_id) {
        return Ok(());
    }

    let wishlist: Vec<Uuid> = existing
        .wishlist
        .0
        .iter()
        .copied()
        .filter(|id| *id != product_id)
        .collect();

    let mut active: UserActive = existing.into();
    active.wishlist = Set(Wishlist(wishlist));
    active.update(&state.orm).await?;

    Ok(())
}

pub async fn list(state: &AppState, user: &AuthUser) -> AppResult<Vec<Product>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if existing.wishlist.0.is_empty() {
        return Ok(Vec::new());
    }

    let products = Products::find()
        .filter(ProdCol::Id.is_in(existing.wishlist.0))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(products)
}
