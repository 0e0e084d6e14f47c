use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::user_dto::{RegisterUserPayload, UserResponse},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "User registered", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload or email already taken"),
        (status = 403, description = "Admin account requested by a non-admin")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    // registration is public; a bearer token is only needed to create
    // another admin
    let principal = match claims {
        Some(Extension(claims)) => Some(claims.principal()?),
        None => None,
    };
    let user = state
        .user_service
        .register(payload, principal.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user profile", body = Json<UserResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    let user = state.user_service.get_by_id(principal.id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/me/notifications",
    responses(
        (status = 200, description = "Notifications for the current user"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn my_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    let notifications = state.user_service.list_notifications(principal.id).await?;
    Ok(Json(notifications))
}
