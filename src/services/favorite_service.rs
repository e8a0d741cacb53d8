use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::favorites::{AddFavoriteRequest, FavoriteList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Favorite, Product},
    response::ApiResponse,
    state::AppState,
};

async fn load_list(state: &AppState, user: &AuthUser) -> AppResult<FavoriteList> {
    let items: Vec<Favorite> =
        sqlx::query_as("SELECT * FROM favorites WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user.user_id)
            .fetch_all(&state.pool)
            .await?;
    Ok(FavoriteList { items })
}

pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FavoriteList>> {
    let list = load_list(state, user).await?;
    Ok(ApiResponse::success("OK", list, None))
}

pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<FavoriteList>> {
    let product_id = Uuid::parse_str(&payload.product_id)
        .map_err(|_| AppError::BadRequest("Invalid product ID".to_string()))?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .fetch_optional(&state.pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::BadRequest(
            "Product already in favorites".to_string(),
        ));
    }

    let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;

    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    // Write-once snapshot of the product as it looks right now.
    sqlx::query(
        r#"
        INSERT INTO favorites
            (id, user_id, product_id, name, price, image, description,
             category, brand, demographic, sizes, colors, rating)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.images.first().cloned().unwrap_or_default())
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.brand)
    .bind(&product.demographic)
    .bind(&product.sizes)
    .bind(&product.colors)
    .bind(product.rating)
    .execute(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "favorite_add",
        Some("favorites"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let list = load_list(state, user).await?;
    Ok(ApiResponse::success("Added to favorites", list, None))
}

/// Deleting an absent favorite is a no-op; the refreshed list is returned
/// either way.
pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    favorite_id: Uuid,
) -> AppResult<ApiResponse<FavoriteList>> {
    sqlx::query("DELETE FROM favorites WHERE id = $1 AND user_id = $2")
        .bind(favorite_id)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "favorite_remove",
        Some("favorites"),
        Some(serde_json::json!({ "favorite_id": favorite_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let list = load_list(state, user).await?;
    Ok(ApiResponse::success("Removed from favorites", list, None))
}

pub async fn clear_favorites(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FavoriteList>> {
    sqlx::query("DELETE FROM favorites WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "favorite_clear",
        Some("favorites"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Favorites cleared",
        FavoriteList { items: Vec::new() },
        None,
    ))
}
