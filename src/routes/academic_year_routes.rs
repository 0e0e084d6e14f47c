use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::academic_year_dto::{AcademicYearResponse, CreateAcademicYearPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/academic-years",
    request_body = CreateAcademicYearPayload,
    responses(
        (status = 201, description = "Academic year created", body = Json<AcademicYearResponse>),
        (status = 400, description = "Invalid payload or duplicate year")
    )
)]
#[axum::debug_handler]
pub async fn create_academic_year(
    State(state): State<AppState>,
    Json(payload): Json<CreateAcademicYearPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let year = state.academic_year_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(AcademicYearResponse::from(year))))
}

#[utoipa::path(
    get,
    path = "/api/academic-years",
    responses(
        (status = 200, description = "All academic years")
    )
)]
#[axum::debug_handler]
pub async fn list_academic_years(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let years = state.academic_year_service.list().await?;
    let response: Vec<AcademicYearResponse> = years.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/academic-years/{id}",
    params(("id" = Uuid, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year found", body = Json<AcademicYearResponse>),
        (status = 404, description = "Academic year not found")
    )
)]
#[axum::debug_handler]
pub async fn get_academic_year(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let year = state.academic_year_service.get_by_id(id).await?;
    Ok(Json(AcademicYearResponse::from(year)))
}
