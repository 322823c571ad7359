use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::DashboardStats,
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        checkout::{
            CheckoutStatusResponse, CreateSessionRequest, CreateSessionResponse, WebhookAck,
        },
        newsletter::SubscribeRequest,
        orders::{CreateOrderRequest, UpdateOrderStatusRequest},
        products::ProductPayload,
        profile::UpdateProfileRequest,
        reviews::CreateReviewRequest,
    },
    models::{NewsletterSubscriber, Order, OrderItem, Product, Review, UserProfile},
    response::MessageResponse,
    routes::health::HealthData,
    routes::{admin, auth, checkout, health, newsletter, orders, products, profile, reviews, wishlist},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        products::list_products,
        products::get_product,
        products::list_categories,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_product_reviews,
        reviews::create_review,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        admin::list_all_orders,
        admin::update_order_status,
        admin::list_newsletter_subscribers,
        admin::dashboard,
        checkout::create_session,
        checkout::checkout_status,
        checkout::stripe_webhook,
        newsletter::subscribe,
        profile::update_profile,
    ),
    components(
        schemas(
            UserProfile,
            Product,
            Review,
            Order,
            OrderItem,
            NewsletterSubscriber,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            ProductPayload,
            CreateReviewRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            CreateSessionRequest,
            CreateSessionResponse,
            CheckoutStatusResponse,
            WebhookAck,
            SubscribeRequest,
            UpdateProfileRequest,
            DashboardStats,
            MessageResponse,
            HealthData,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login, current profile"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Checkout", description = "Hosted checkout and webhook"),
        (name = "Newsletter", description = "Newsletter capture"),
        (name = "Profile", description = "Profile update"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
