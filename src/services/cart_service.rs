use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartLine, CartView, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::ApiResponse,
    state::AppState,
};

/// Assemble the user's cart lines populated with live product fields.
/// Postgres arrays are 1-indexed, hence `images[1]` for the lead image.
async fn load_view(state: &AppState, user: &AuthUser) -> AppResult<CartView> {
    let lines: Vec<CartLine> = sqlx::query_as(
        r#"
        SELECT ci.id, ci.product_id, p.name, p.price,
               COALESCE(p.images[1], '') AS image,
               ci.quantity, ci.size, ci.color
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(CartView::from_lines(lines))
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let view = load_view(state, user).await?;
    Ok(ApiResponse::success("OK", view, None))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let product_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::BadRequest("Product not found".to_string()));
    }

    // One line per (product, size, color) tuple; repeats increment quantity.
    let existing: Option<CartItem> = sqlx::query_as(
        r#"
        SELECT * FROM cart_items
        WHERE user_id = $1 AND product_id = $2
          AND size IS NOT DISTINCT FROM $3
          AND color IS NOT DISTINCT FROM $4
        "#,
    )
    .bind(user.user_id)
    .bind(payload.product_id)
    .bind(payload.size.as_deref())
    .bind(payload.color.as_deref())
    .fetch_optional(&state.pool)
    .await?;

    if let Some(item) = existing {
        sqlx::query(
            "UPDATE cart_items SET quantity = quantity + $3, updated_at = now() WHERE id = $1 AND user_id = $2",
        )
        .bind(item.id)
        .bind(user.user_id)
        .bind(payload.quantity)
        .execute(&state.pool)
        .await?;
    } else {
        sqlx::query(
            "INSERT INTO cart_items (id, user_id, product_id, quantity, size, color) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .bind(payload.size.as_deref())
        .bind(payload.color.as_deref())
        .execute(&state.pool)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = load_view(state, user).await?;
    Ok(ApiResponse::success("Added to cart", view, None))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let result = sqlx::query(
        "UPDATE cart_items SET quantity = $3, updated_at = now() WHERE id = $1 AND user_id = $2",
    )
    .bind(item_id)
    .bind(user.user_id)
    .bind(payload.quantity)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let view = load_view(state, user).await?;
    Ok(ApiResponse::success("Cart updated", view, None))
}

/// Remove a line by its id, falling back to a product-id match, which is
/// what older clients send.
pub async fn remove_cart_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let by_id = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if by_id.rows_affected() == 0 {
        let by_product =
            sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
                .bind(item_id)
                .bind(user.user_id)
                .execute(&state.pool)
                .await?;
        if by_product.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = load_view(state, user).await?;
    Ok(ApiResponse::success("Removed from cart", view, None))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_clear",
        Some("cart_items"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = load_view(state, user).await?;
    Ok(ApiResponse::success("Cart cleared", view, None))
}
