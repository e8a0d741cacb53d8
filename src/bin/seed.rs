use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_user(&pool, "Demo Shopper", "demo@example.com", "demo123").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email}");
    Ok(user_id)
}

struct SeedProduct {
    // Fixed ids keep reseeding idempotent without constraining product names.
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    category: &'static str,
    brand: &'static str,
    demographic: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    featured: bool,
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        SeedProduct {
            id: "0a6f9a2e-8a1d-4a7e-9b3c-1f2e3d4c5b6a",
            name: "Classic White Shirt",
            description: "Crisp cotton shirt for everyday wear",
            price: 2599,
            category: "shirt",
            brand: "StyleBrand",
            demographic: "Men",
            sizes: &["S", "M", "L", "XL"],
            colors: &["White", "Blue"],
            featured: true,
        },
        SeedProduct {
            id: "1b7e8d3f-9c2a-4b8f-8d4e-2a3b4c5d6e7f",
            name: "Slim Fit Chinos",
            description: "Tailored chinos with a touch of stretch",
            price: 3499,
            category: "pants",
            brand: "UrbanEdge",
            demographic: "Men",
            sizes: &["30", "32", "34", "36"],
            colors: &["Khaki", "Navy"],
            featured: true,
        },
        SeedProduct {
            id: "2c8f9e4a-0d3b-4c9a-9e5f-3b4c5d6e7f8a",
            name: "Floral Summer Dress",
            description: "Lightweight dress with an all-over floral print",
            price: 4299,
            category: "dress",
            brand: "StyleBrand",
            demographic: "Women",
            sizes: &["XS", "S", "M", "L"],
            colors: &["Red", "Yellow"],
            featured: true,
        },
        SeedProduct {
            id: "3d9a0f5b-1e4c-4d0b-8f6a-4c5d6e7f8a9b",
            name: "Denim Jacket",
            description: "Washed denim jacket with classic styling",
            price: 5999,
            category: "jacket",
            brand: "UrbanEdge",
            demographic: "Women",
            sizes: &["S", "M", "L"],
            colors: &["Blue", "Black"],
            featured: true,
        },
        SeedProduct {
            id: "4e0b1a6c-2f5d-4e1c-9a7b-5d6e7f8a9b0c",
            name: "Graphic Tee",
            description: "Soft cotton tee with a printed front",
            price: 1499,
            category: "shirt",
            brand: "StreetWave",
            demographic: "Kids",
            sizes: &["S", "M", "L"],
            colors: &["Black", "White", "Green"],
            featured: false,
        },
        SeedProduct {
            id: "5f1c2b7d-3a6e-4f2d-8b8c-6e7f8a9b0c1d",
            name: "Running Shorts",
            description: "Breathable shorts with an inner liner",
            price: 1999,
            category: "shorts",
            brand: "StreetWave",
            demographic: "Men",
            sizes: &["S", "M", "L", "XL"],
            colors: &["Grey", "Black"],
            featured: false,
        },
    ];

    for product in products {
        let sizes: Vec<String> = product.sizes.iter().map(|s| s.to_string()).collect();
        let colors: Vec<String> = product.colors.iter().map(|s| s.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, category, brand, demographic,
                 sizes, colors, images, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::parse_str(product.id)?)
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.category)
        .bind(product.brand)
        .bind(product.demographic)
        .bind(&sizes)
        .bind(&colors)
        .bind(Vec::<String>::new())
        .bind(product.featured)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
