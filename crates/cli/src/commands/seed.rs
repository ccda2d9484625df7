//! Database seeding command.
//!
//! Inserts a demo merchant, buyer, store, catalog, and courier configuration
//! for local development. Idempotent: rows are keyed on natural uniques and
//! conflicts are skipped.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;

use kebuncuan_core::Money;

use super::CommandError;

const DEMO_MERCHANT_EMAIL: &str = "merchant@kebuncuan.id";
const DEMO_BUYER_EMAIL: &str = "buyer@kebuncuan.id";
const DEMO_STORE_SLUG: &str = "toko-sayur-segar";

/// Seed the database with a demo tenant.
///
/// # Errors
///
/// Returns `CommandError` when `DATABASE_URL` is missing, the connection
/// fails, or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let merchant_id = upsert_user(&pool, DEMO_MERCHANT_EMAIL, "Ibu Sari", "+6281200000001").await?;
    let buyer_id = upsert_user(&pool, DEMO_BUYER_EMAIL, "Budi Santoso", "+6281200000002").await?;
    let store_id = upsert_store(&pool, merchant_id).await?;
    seed_catalog(&pool, store_id).await?;
    seed_shipping_provider(&pool, store_id).await?;

    tracing::info!(
        merchant_id,
        buyer_id,
        store_id,
        "Seed complete: store '{DEMO_STORE_SLUG}' is ready"
    );
    Ok(())
}

async fn upsert_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    phone: &str,
) -> Result<i32, CommandError> {
    sqlx::query(
        "INSERT INTO app_user (email, name, phone) VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(email)
    .bind(name)
    .bind(phone)
    .execute(pool)
    .await?;

    let (id,): (i32,) = sqlx::query_as("SELECT id FROM app_user WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

async fn upsert_store(pool: &PgPool, owner_id: i32) -> Result<i32, CommandError> {
    sqlx::query(
        "INSERT INTO store (slug, name, owner_id, address, postal_code, \
                            contact_name, contact_phone, tax_enabled) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (slug) DO NOTHING",
    )
    .bind(DEMO_STORE_SLUG)
    .bind("Toko Sayur Segar")
    .bind(owner_id)
    .bind("Jl. Kebun Raya No. 1, Bogor")
    .bind("16122")
    .bind("Ibu Sari")
    .bind("+6281200000001")
    .bind(false)
    .execute(pool)
    .await?;

    let (id,): (i32,) = sqlx::query_as("SELECT id FROM store WHERE slug = $1")
        .bind(DEMO_STORE_SLUG)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

async fn seed_catalog(pool: &PgPool, store_id: i32) -> Result<(), CommandError> {
    let (category_id,): (i32,) = sqlx::query_as(
        "WITH existing AS (SELECT id FROM category WHERE store_id = $1 AND name = $2), \
              inserted AS ( \
                  INSERT INTO category (store_id, name) \
                  SELECT $1, $2 WHERE NOT EXISTS (SELECT 1 FROM existing) \
                  RETURNING id) \
         SELECT id FROM existing UNION ALL SELECT id FROM inserted",
    )
    .bind(store_id)
    .bind("Sayuran")
    .fetch_one(pool)
    .await?;

    let products: [(&str, i64, i64, i32); 3] = [
        ("Pupuk Organik 1kg", 50_000, 35_000, 1_000),
        ("Bayam Hidroponik 250g", 12_500, 8_000, 250),
        ("Cabai Rawit 500g", 30_000, 22_000, 500),
    ];

    for (name, price, modal_price, weight_grams) in products {
        sqlx::query(
            "INSERT INTO product (store_id, category_id, name, description, \
                                  price, modal_price, weight_grams, active, images) \
             SELECT $1, $2, $3, '', $4, $5, $6, TRUE, '{}' \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM product WHERE store_id = $1 AND name = $3)",
        )
        .bind(store_id)
        .bind(category_id)
        .bind(name)
        .bind(Money::from_rupiah(price))
        .bind(Money::from_rupiah(modal_price))
        .bind(weight_grams)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn seed_shipping_provider(pool: &PgPool, store_id: i32) -> Result<(), CommandError> {
    sqlx::query(
        "INSERT INTO shipping_provider (store_id, active, origin_area_id, quota_limit) \
         VALUES ($1, TRUE, $2, 100) \
         ON CONFLICT (store_id) DO NOTHING",
    )
    .bind(store_id)
    .bind("IDNP6IDNC148") // Bogor
    .execute(pool)
    .await?;

    Ok(())
}
