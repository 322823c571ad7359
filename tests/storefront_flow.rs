use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Statement};
use uuid::Uuid;

use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::RegisterRequest,
        checkout::CreateSessionRequest,
        newsletter::SubscribeRequest,
        orders::{CreateOrderRequest, UpdateOrderStatusRequest},
        products::{ProductPayload, ProductQuery},
        reviews::CreateReviewRequest,
    },
    entity::{newsletter, orders, payment_transactions},
    error::AppError,
    middleware::auth::AuthUser,
    models::OrderItem,
    payments::{
        CheckoutProvider, CheckoutSession, ProviderError, SessionRequest, SessionStatus,
        WebhookEvent,
    },
    services::{
        admin_service, auth_service, newsletter_service, order_service, payment_service,
        product_service, review_service, wishlist_service,
    },
    state::AppState,
};

const SESSION_ID: &str = "cs_test_flow_1";

/// Provider double: reports "unpaid" until flipped, then "paid" forever.
struct MockCheckout {
    paid: AtomicBool,
}

#[async_trait]
impl CheckoutProvider for MockCheckout {
    async fn create_session(&self, req: SessionRequest) -> Result<CheckoutSession, ProviderError> {
        assert_eq!(req.currency, "usd");
        Ok(CheckoutSession {
            session_id: SESSION_ID.to_string(),
            url: format!("https://checkout.example/pay/{SESSION_ID}"),
        })
    }

    async fn session_status(&self, _session_id: &str) -> Result<SessionStatus, ProviderError> {
        if self.paid.load(Ordering::SeqCst) {
            Ok(SessionStatus {
                status: "complete".into(),
                payment_status: "paid".into(),
                amount_total: 5998,
                currency: "usd".into(),
            })
        } else {
            Ok(SessionStatus {
                status: "open".into(),
                payment_status: "unpaid".into(),
                amount_total: 5998,
                currency: "usd".into(),
            })
        }
    }

    fn parse_webhook(
        &self,
        body: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, ProviderError> {
        if signature_header != "valid" {
            return Err(ProviderError::Signature("mock rejection".into()));
        }
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(WebhookEvent {
            session_id: value["session_id"].as_str().map(String::from),
            payment_status: value["payment_status"].as_str().unwrap_or("").to_string(),
        })
    }
}

// Full storefront pass: register -> catalog -> reviews -> wishlist -> order ->
// hosted checkout session -> poll/webhook reconciliation -> admin aggregates.
#[tokio::test]
async fn storefront_end_to_end_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let provider = Arc::new(MockCheckout {
        paid: AtomicBool::new(false),
    });
    let state = setup_state(&database_url, provider.clone()).await?;

    // -- Registration and the auth boundary ---------------------------------
    let registered = auth_service::register(
        &state,
        RegisterRequest {
            email: "shopper@example.com".into(),
            password: "hunter2".into(),
            name: "First Shopper".into(),
            phone: None,
        },
    )
    .await?;
    assert!(!registered.user.is_admin);
    assert!(registered.user.wishlist.is_empty());

    let duplicate = auth_service::register(
        &state,
        RegisterRequest {
            email: "shopper@example.com".into(),
            password: "other".into(),
            name: "Second Shopper".into(),
            phone: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let shopper = AuthUser {
        user_id: registered.user.id,
        email: registered.user.email.clone(),
        is_admin: false,
    };
    // Claims are trusted verbatim, so an admin identity needs no user row.
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        email: "admin@example.com".into(),
        is_admin: true,
    };

    assert!(matches!(
        admin_service::list_all_orders(&state, &shopper).await,
        Err(AppError::Forbidden)
    ));

    // -- Catalog ------------------------------------------------------------
    let product = product_service::create_product(
        &state,
        &admin,
        ProductPayload {
            name: "Turmeric Glow Soap".into(),
            description: "Cold-pressed soap".into(),
            price: Decimal::from_str("29.99")?,
            category: "skincare".into(),
            images: vec![],
            labels: vec!["bestseller".into()],
            benefits: vec![],
            stock: 10,
        },
    )
    .await?;
    assert_eq!(product.rating, Decimal::ZERO);

    assert!(matches!(
        product_service::create_product(
            &state,
            &shopper,
            ProductPayload {
                name: "Nope".into(),
                description: String::new(),
                price: Decimal::ONE,
                category: "misc".into(),
                images: vec![],
                labels: vec![],
                benefits: vec![],
                stock: 0,
            },
        )
        .await,
        Err(AppError::Forbidden)
    ));

    let found = product_service::list_products(
        &state,
        ProductQuery {
            category: None,
            search: Some("turmeric".into()),
        },
    )
    .await?;
    assert_eq!(found.len(), 1, "case-insensitive name search should match");

    // -- Reviews and the derived rating -------------------------------------
    review_service::create_review(
        &state,
        &shopper,
        CreateReviewRequest {
            product_id: product.id,
            rating: 5,
            comment: "Lovely".into(),
        },
    )
    .await?;

    let second = auth_service::register(
        &state,
        RegisterRequest {
            email: "second@example.com".into(),
            password: "hunter2".into(),
            name: "Second Shopper".into(),
            phone: None,
        },
    )
    .await?;
    let second_user = AuthUser {
        user_id: second.user.id,
        email: second.user.email.clone(),
        is_admin: false,
    };
    review_service::create_review(
        &state,
        &second_user,
        CreateReviewRequest {
            product_id: product.id,
            rating: 4,
            comment: "Good".into(),
        },
    )
    .await?;

    let rated = product_service::get_product(&state, product.id).await?;
    assert_eq!(rated.rating, Decimal::from_str("4.5")?);
    assert_eq!(rated.reviews_count, 2);

    assert!(matches!(
        review_service::create_review(
            &state,
            &shopper,
            CreateReviewRequest {
                product_id: product.id,
                rating: 6,
                comment: "Too good".into(),
            },
        )
        .await,
        Err(AppError::Validation(_))
    ));

    // -- Wishlist set semantics ---------------------------------------------
    wishlist_service::add(&state, &shopper, product.id).await?;
    wishlist_service::add(&state, &shopper, product.id).await?;
    let wishlist = wishlist_service::list(&state, &shopper).await?;
    assert_eq!(wishlist.len(), 1, "double add must leave one entry");
    wishlist_service::remove(&state, &shopper, Uuid::new_v4()).await?;
    wishlist_service::remove(&state, &shopper, product.id).await?;
    assert!(wishlist_service::list(&state, &shopper).await?.is_empty());

    // -- Order with a frozen total ------------------------------------------
    let order = order_service::create_order(
        &state,
        &shopper,
        CreateOrderRequest {
            items: vec![OrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: 2,
                price: Decimal::from_str("29.99")?,
            }],
            shipping_address: serde_json::json!({ "line1": "1 Main St", "city": "Springfield" }),
        },
    )
    .await?;
    assert_eq!(order.total, Decimal::from_str("59.98")?);
    assert_eq!(order.status, "pending");
    assert_eq!(order.payment_status, "pending");

    // Later catalog price changes must not reprice the order.
    product_service::update_product(
        &state,
        &admin,
        product.id,
        ProductPayload {
            name: product.name.clone(),
            description: "Cold-pressed soap".into(),
            price: Decimal::from_str("99.00")?,
            category: "skincare".into(),
            images: vec![],
            labels: vec![],
            benefits: vec![],
            stock: 10,
        },
    )
    .await?;
    let reloaded = order_service::get_own(&state, &shopper, order.id).await?;
    assert_eq!(reloaded.total, Decimal::from_str("59.98")?);

    // Owner scoping: another user cannot see the order.
    assert!(matches!(
        order_service::get_own(&state, &second_user, order.id).await,
        Err(AppError::NotFound(_))
    ));

    // -- Checkout session ----------------------------------------------------
    let session = payment_service::create_session(
        &state,
        &shopper,
        CreateSessionRequest {
            order_id: order.id,
            host_url: "https://shop.example/".into(),
        },
    )
    .await?;
    assert_eq!(session.session_id, SESSION_ID);

    let with_session = order_service::get_own(&state, &shopper, order.id).await?;
    assert_eq!(with_session.payment_session_id.as_deref(), Some(SESSION_ID));

    // -- Poll before the provider confirms: order untouched ------------------
    let pending = payment_service::poll_status(&state, &shopper, SESSION_ID).await?;
    assert_ne!(pending.payment_status, "paid");
    let untouched = order_service::get_own(&state, &shopper, order.id).await?;
    assert_eq!(untouched.status, "pending");
    assert_eq!(untouched.payment_status, "pending");

    assert!(matches!(
        payment_service::poll_status(&state, &shopper, "cs_unknown").await,
        Err(AppError::NotFound(_))
    ));

    // -- Provider confirms; poll applies the transition ----------------------
    provider.paid.store(true, Ordering::SeqCst);
    let paid = payment_service::poll_status(&state, &shopper, SESSION_ID).await?;
    assert_eq!(paid.payment_status, "paid");

    let confirmed = order_service::get_own(&state, &shopper, order.id).await?;
    assert_eq!(confirmed.status, "confirmed");
    assert_eq!(confirmed.payment_status, "paid");

    // A paid order cannot open another session.
    assert!(matches!(
        payment_service::create_session(
            &state,
            &shopper,
            CreateSessionRequest {
                order_id: order.id,
                host_url: "https://shop.example".into(),
            },
        )
        .await,
        Err(AppError::Conflict(_))
    ));

    // -- Reconciliation idempotence: second observers write nothing ----------
    let tx_after_poll = payment_transactions::Entity::find()
        .filter(payment_transactions::Column::SessionId.eq(SESSION_ID))
        .one(&state.orm)
        .await?
        .expect("transaction row");
    let order_after_poll = orders::Entity::find_by_id(order.id)
        .one(&state.orm)
        .await?
        .expect("order row");

    payment_service::poll_status(&state, &shopper, SESSION_ID).await?;
    let webhook_body = serde_json::json!({
        "session_id": SESSION_ID,
        "payment_status": "paid",
    })
    .to_string();
    payment_service::handle_webhook(&state, webhook_body.as_bytes(), "valid").await?;

    let tx_after_replay = payment_transactions::Entity::find()
        .filter(payment_transactions::Column::SessionId.eq(SESSION_ID))
        .one(&state.orm)
        .await?
        .expect("transaction row");
    let order_after_replay = orders::Entity::find_by_id(order.id)
        .one(&state.orm)
        .await?
        .expect("order row");
    assert_eq!(tx_after_poll.updated_at, tx_after_replay.updated_at);
    assert_eq!(order_after_poll.updated_at, order_after_replay.updated_at);
    assert_eq!(order_after_replay.payment_status, "paid");

    // Webhook with a bad signature is rejected; unknown session is tolerated.
    assert!(matches!(
        payment_service::handle_webhook(&state, webhook_body.as_bytes(), "bogus").await,
        Err(AppError::InvalidWebhookSignature)
    ));
    let unknown = serde_json::json!({ "session_id": "cs_gone", "payment_status": "paid" });
    payment_service::handle_webhook(&state, unknown.to_string().as_bytes(), "valid").await?;

    // -- Admin order mutation -------------------------------------------------
    let shipped = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
            tracking_number: Some("TRK-1".into()),
        },
    )
    .await?;
    assert_eq!(shipped.tracking_number.as_deref(), Some("TRK-1"));

    // Absent tracking number leaves the stored one alone.
    let delivered = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: "delivered".into(),
            tracking_number: None,
        },
    )
    .await?;
    assert_eq!(delivered.tracking_number.as_deref(), Some("TRK-1"));

    // -- Newsletter idempotence ----------------------------------------------
    let first = newsletter_service::subscribe(
        &state,
        SubscribeRequest {
            email: "news@example.com".into(),
        },
    )
    .await?;
    assert_eq!(first.message, "Subscribed successfully");
    let again = newsletter_service::subscribe(
        &state,
        SubscribeRequest {
            email: "news@example.com".into(),
        },
    )
    .await?;
    assert_eq!(again.message, "Already subscribed");
    let subscriber_count = newsletter::Entity::find().count(&state.orm).await?;
    assert_eq!(subscriber_count, 1);

    // -- Dashboard aggregates -------------------------------------------------
    let stats = admin_service::dashboard(&state, &admin).await?;
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_products, 1);
    assert_eq!(stats.total_orders, 1);
    assert_eq!(stats.total_revenue, Decimal::from_str("59.98")?);
    assert_eq!(stats.recent_orders.len(), 1);

    Ok(())
}

async fn setup_state(
    database_url: &str,
    checkout: Arc<MockCheckout>,
) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs.
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE payment_transactions, orders, reviews, newsletter, products, users CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-test-secret".into(),
        jwt_ttl_hours: 72,
        stripe_api_key: String::new(),
        stripe_webhook_secret: String::new(),
        checkout_currency: "usd".into(),
        cors_origins: vec!["*".into()],
    };

    Ok(AppState {
        orm,
        config,
        checkout,
    })
}
