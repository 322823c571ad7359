use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::str::FromStr;
use uuid::Uuid;

use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, StringList},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Wishlist},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "admin123", "Store Admin", true).await?;
    let user_id = ensure_user(&orm, "user@example.com", "user123", "Test Shopper", false).await?;
    seed_products(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    name: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        name: Set(name.to_string()),
        phone: Set(None),
        address: Set(None),
        wishlist: Set(Wishlist::default()),
        is_admin: Set(is_admin),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (admin={is_admin})");
    Ok(user.id)
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let products = [
        (
            "Turmeric Glow Soap",
            "Cold-pressed soap with turmeric and shea butter",
            "9.99",
            "skincare",
            vec!["bestseller"],
            60,
        ),
        (
            "Herbal Hair Oil",
            "Amla and bhringraj blend for daily care",
            "14.50",
            "haircare",
            vec!["new"],
            45,
        ),
        (
            "Rose Water Toner",
            "Steam-distilled rose hydrosol",
            "12.00",
            "skincare",
            vec![],
            80,
        ),
        (
            "Neem Face Pack",
            "Clay pack with neem and tulsi",
            "11.25",
            "skincare",
            vec!["vegan"],
            30,
        ),
    ];

    for (name, desc, price, category, labels, stock) in products {
        let exists = Products::find()
            .filter(ProdCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(desc.to_string()),
            price: Set(Decimal::from_str(price)?),
            category: Set(category.to_string()),
            images: Set(StringList::default()),
            labels: Set(StringList(labels.into_iter().map(String::from).collect())),
            benefits: Set(StringList::default()),
            stock: Set(stock),
            rating: Set(Decimal::ZERO),
            reviews_count: Set(0),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
