use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    dto::products::ProductList,
    error::{AppError, AppResult},
    models::Product,
    response::ApiResponse,
    routes::params::{ProductQuery, comma_list, min_rating},
    state::AppState,
};

const FEATURED_LIMIT: i64 = 4;
const BEST_SELLERS_LIMIT: i64 = 4;
const RELATED_LIMIT: i64 = 3;
const NEW_ARRIVALS_DEFAULT_LIMIT: i64 = 20;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products WHERE 1=1");

    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(demographic) = query.demographic.as_ref().filter(|s| !s.is_empty()) {
        qb.push(" AND demographic = ").push_bind(demographic.clone());
    }
    if let Some(sizes) = query.sizes.as_deref().map(comma_list).filter(|v| !v.is_empty()) {
        qb.push(" AND sizes && ").push_bind(sizes);
    }
    if let Some(colors) = query.colors.as_deref().map(comma_list).filter(|v| !v.is_empty()) {
        qb.push(" AND colors && ").push_bind(colors);
    }
    if let Some(brands) = query.brands.as_deref().map(comma_list).filter(|v| !v.is_empty()) {
        qb.push(" AND brand = ANY(").push_bind(brands).push(")");
    }
    if let Some(min_price) = query.min_price {
        qb.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        qb.push(" AND price <= ").push_bind(max_price);
    }
    if let Some(rating) = query.ratings.as_deref().and_then(min_rating) {
        qb.push(" AND rating >= ").push_bind(rating);
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR brand ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY ")
        .push(query.sort.unwrap_or_default().order_by_sql());

    let items = qb
        .build_query_as::<Product>()
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::success("Products", ProductList { items }, None))
}

/// Featured picks, falling back to the newest products when nothing is
/// flagged yet.
pub async fn featured_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let mut items: Vec<Product> =
        sqlx::query_as("SELECT * FROM products WHERE featured = TRUE LIMIT $1")
            .bind(FEATURED_LIMIT)
            .fetch_all(&state.pool)
            .await?;

    if items.is_empty() {
        items = sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC LIMIT $1")
            .bind(FEATURED_LIMIT)
            .fetch_all(&state.pool)
            .await?;
    }

    Ok(ApiResponse::success(
        "Featured products",
        ProductList { items },
        None,
    ))
}

pub async fn new_arrivals(state: &AppState, limit: Option<i64>) -> AppResult<ApiResponse<ProductList>> {
    let limit = limit.unwrap_or(NEW_ARRIVALS_DEFAULT_LIMIT).clamp(1, 100);
    let items: Vec<Product> =
        sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "New arrivals",
        ProductList { items },
        None,
    ))
}

pub async fn best_sellers(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> =
        sqlx::query_as("SELECT * FROM products ORDER BY rating DESC LIMIT $1")
            .bind(BEST_SELLERS_LIMIT)
            .fetch_all(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "Best sellers",
        ProductList { items },
        None,
    ))
}

/// Products sharing a category, brand, or demographic with the given one.
pub async fn related_products(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductList>> {
    let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;

    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let items: Vec<Product> = sqlx::query_as(
        r#"
        SELECT * FROM products
        WHERE id <> $1
          AND (category = $2 OR brand = $3 OR demographic = $4)
        LIMIT $5
        "#,
    )
    .bind(product.id)
    .bind(product.category)
    .bind(product.brand)
    .bind(product.demographic)
    .bind(RELATED_LIMIT)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Related products",
        ProductList { items },
        None,
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;

    match product {
        Some(p) => Ok(ApiResponse::success("Product", p, None)),
        None => Err(AppError::NotFound),
    }
}
