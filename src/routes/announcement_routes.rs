use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::announcement_dto::{
        AnnouncementResponse, CreateAnnouncementPayload, UpdateAnnouncementPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body = CreateAnnouncementPayload,
    responses(
        (status = 201, description = "Announcement created", body = Json<AnnouncementResponse>),
        (status = 400, description = "Invalid payload or duplicate title"),
        (status = 404, description = "Academic year not found")
    )
)]
#[axum::debug_handler]
pub async fn create_announcement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAnnouncementPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let principal = claims.principal()?;
    let announcement = state
        .announcement_service
        .create(&principal, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AnnouncementResponse::from(announcement)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementPayload,
    responses(
        (status = 200, description = "Announcement updated", body = Json<AnnouncementResponse>),
        (status = 404, description = "Announcement not found")
    )
)]
#[axum::debug_handler]
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnnouncementPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let announcement = state.announcement_service.update(id, payload).await?;
    Ok(Json(AnnouncementResponse::from(announcement)))
}

#[utoipa::path(
    post,
    path = "/api/announcements/{id}/publish",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement published", body = Json<AnnouncementResponse>),
        (status = 400, description = "Announcement cannot be published"),
        (status = 404, description = "Announcement not found")
    )
)]
#[axum::debug_handler]
pub async fn publish_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let announcement = state.announcement_service.publish(id).await?;
    Ok(Json(AnnouncementResponse::from(announcement)))
}

#[utoipa::path(
    post,
    path = "/api/announcements/{id}/close",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement closed", body = Json<AnnouncementResponse>),
        (status = 400, description = "Announcement is not published"),
        (status = 404, description = "Announcement not found")
    )
)]
#[axum::debug_handler]
pub async fn close_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let announcement = state.announcement_service.close(id).await?;
    Ok(Json(AnnouncementResponse::from(announcement)))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 404, description = "Announcement not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.announcement_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/announcements",
    responses(
        (status = 200, description = "All announcements")
    )
)]
#[axum::debug_handler]
pub async fn list_announcements(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let announcements = state.announcement_service.list().await?;
    let response: Vec<AnnouncementResponse> = announcements.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement found", body = Json<AnnouncementResponse>),
        (status = 404, description = "Announcement not found")
    )
)]
#[axum::debug_handler]
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let announcement = state.announcement_service.get_by_id(id).await?;
    Ok(Json(AnnouncementResponse::from(announcement)))
}
