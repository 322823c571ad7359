use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::reviews::CreateReviewRequest,
    entity::products::{ActiveModel as ProductActive, Entity as Products},
    entity::reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
    entity::users::Entity as Users,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    state::AppState,
};

pub async fn list_for_product(state: &AppState, product_id: Uuid) -> AppResult<Vec<Review>> {
    let reviews = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();
    Ok(reviews)
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<Review> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::Validation("Rating must be between 1 and 5".into()));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    // Snapshot the author's current display name; later renames do not
    // retroactively alter historic reviews.
    let author = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        user_id: Set(user.user_id),
        user_name: Set(author.name),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // Re-read the full review set instead of keeping a running sum; O(n) per
    // review, but the aggregate can never drift from ground truth.
    let all_ratings: Vec<i32> = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    let mut active: ProductActive = product.into();
    active.rating = Set(average_rating(&all_ratings));
    active.reviews_count = Set(all_ratings.len() as i32);
    active.update(&state.orm).await?;

    Ok(review_from_entity(review))
}

/// Arithmetic mean rounded to one decimal place; zero for an empty set.
fn average_rating(ratings: &[i32]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    (Decimal::from(sum) / Decimal::from(ratings.len() as i64)).round_dp(1)
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        product_id: model.product_id,
        user_id: model.user_id,
        user_name: model.user_name,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::average_rating;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn empty_review_set_averages_to_zero() {
        assert_eq!(average_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        assert_eq!(average_rating(&[5, 4]), Decimal::from_str("4.5").unwrap());
        assert_eq!(
            average_rating(&[5, 4, 4]),
            Decimal::from_str("4.3").unwrap()
        );
        assert_eq!(average_rating(&[1, 1, 1, 2]), Decimal::from_str("1.2").unwrap());
    }

    #[test]
    fn single_review_is_exact() {
        assert_eq!(average_rating(&[3]), Decimal::from(3));
    }
}
