use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::password_reset_dto::{PasswordResetConfirmPayload, PasswordResetRequestPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/password-reset/request",
    request_body = PasswordResetRequestPayload,
    responses(
        (status = 200, description = "Reset code sent"),
        (status = 404, description = "Unknown email")
    )
)]
#[axum::debug_handler]
pub async fn request_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.password_reset_service.request(&payload.email).await?;
    Ok(Json(json!({ "message": "Reset code sent" })))
}

#[utoipa::path(
    post,
    path = "/api/password-reset/confirm",
    request_body = PasswordResetConfirmPayload,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid, used or expired code"),
        (status = 404, description = "Unknown email")
    )
)]
#[axum::debug_handler]
pub async fn confirm_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirmPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .password_reset_service
        .confirm(&payload.email, &payload.otp_code, &payload.new_password)
        .await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Password updated" }))))
}
