use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod doc;
pub mod health;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reviews;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .route("/categories", get(products::list_categories))
        .route("/reviews", post(reviews::create_review))
        .nest("/wishlist", wishlist::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
        .nest("/checkout", checkout::router())
        .route("/webhook/stripe", post(checkout::stripe_webhook))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/profile", put(profile::update_profile))
}
