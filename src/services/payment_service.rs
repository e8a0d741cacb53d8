use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::payments::{VerifyPaymentRequest, VerifyPaymentResponse},
    entity::orders::ActiveModel as OrderActive,
    error::{AppError, AppResult},
    gateway::verify_signature,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service::find_scoped,
    state::AppState,
};

/// Checks the gateway's callback signature against our own HMAC and flips
/// the order's payment status. A mismatch marks the order failed before the
/// request is rejected, so a retried callback starts from a clean state.
pub async fn verify_payment(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyPaymentRequest,
) -> AppResult<ApiResponse<VerifyPaymentResponse>> {
    let order_uuid = Uuid::parse_str(&payload.order_id).map_err(|_| AppError::NotFound)?;
    let order = find_scoped(state, user, order_uuid).await?;

    let secret = state
        .config
        .razorpay_key_secret
        .as_deref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("payment gateway is not configured")))?;

    // The signature covers the identifiers exactly as the client sent them.
    if !verify_signature(
        secret,
        &payload.order_id,
        &payload.payment_id,
        &payload.signature,
    ) {
        let mut active: OrderActive = order.into();
        active.payment_status = Set("failed".into());
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?;

        return Err(AppError::BadRequest("Invalid signature".into()));
    }

    let order_id = order.id;
    let mut active: OrderActive = order.into();
    active.payment_status = Set("paid".into());
    active.gateway_payment_id = Set(Some(payload.payment_id.clone()));
    active.gateway_signature = Set(Some(payload.signature.clone()));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_verified",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order_id, "payment_id": payload.payment_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment verified successfully",
        VerifyPaymentResponse { order_id },
        None,
    ))
}
