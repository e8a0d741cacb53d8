use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::{VerifyPaymentRequest, VerifyPaymentResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(verify_payment))
}

#[utoipa::path(
    post,
    path = "/api/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified successfully", body = ApiResponse<VerifyPaymentResponse>),
        (status = 400, description = "Invalid signature"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<VerifyPaymentResponse>>> {
    let response = payment_service::verify_payment(&state, &user, payload).await?;
    Ok(Json(response))
}
