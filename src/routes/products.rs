use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::ProductList,
    error::AppResult,
    models::Product,
    response::ApiResponse,
    routes::params::{LimitQuery, ProductQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/featured", get(featured_products))
        .route("/new-arrivals", get(new_arrivals))
        .route("/best-sellers", get(best_sellers))
        .route("/related/{id}", get(related_products))
        .route("/{id}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("category" = Option<String>, Query, description = "Exact category match"),
        ("search" = Option<String>, Query, description = "Substring match over name, brand and category"),
        ("demographic" = Option<String>, Query, description = "Exact demographic match"),
        ("sort" = Option<String>, Query, description = "price-low-high | price-high-low | rating | newest"),
        ("minPrice" = Option<i64>, Query, description = "Minimum price, inclusive"),
        ("maxPrice" = Option<i64>, Query, description = "Maximum price, inclusive"),
        ("sizes" = Option<String>, Query, description = "Comma-separated sizes, any match"),
        ("colors" = Option<String>, Query, description = "Comma-separated colors, any match"),
        ("brands" = Option<String>, Query, description = "Comma-separated brands"),
        ("ratings" = Option<String>, Query, description = "Comma-separated rating tiers, lowest wins"),
    ),
    responses(
        (status = 200, description = "Filtered product list", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let response = product_service::list_products(&state, query).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    responses(
        (status = 200, description = "Featured products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn featured_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let response = product_service::featured_products(&state).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/products/new-arrivals",
    params(
        ("limit" = Option<i64>, Query, description = "Max items, default 20"),
    ),
    responses(
        (status = 200, description = "Newest products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn new_arrivals(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let response = product_service::new_arrivals(&state, query.limit).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/products/best-sellers",
    responses(
        (status = 200, description = "Top-rated products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn best_sellers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let response = product_service::best_sellers(&state).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/products/related/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Products related to the given one", body = ApiResponse<ProductList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn related_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let response = product_service::related_products(&state, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let response = product_service::get_product(&state, id).await?;
    Ok(Json(response))
}
