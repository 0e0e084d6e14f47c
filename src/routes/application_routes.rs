use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationDetailResponse, ApplicationResponse, CompletenessResponse,
        CreateApplicationPayload, StatusUpdatePayload, UpdateApplicationPayload,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::Principal,
    AppState,
};

fn ensure_owner_or_admin(principal: &Principal, candidate_id: Uuid) -> Result<()> {
    if principal.id != candidate_id && !principal.is_admin() {
        return Err(Error::Forbidden(
            "Applications are only visible to their owner".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/applications/with-documents",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Application created with its documents", body = Json<ApplicationDetailResponse>),
        (status = 400, description = "Window closed, duplicate application or rejected document"),
        (status = 404, description = "Candidate, announcement or academic year not found")
    )
)]
#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let principal = claims.principal()?;
    let (application, documents) = state
        .application_service
        .create(
            &principal,
            payload.candidate_id,
            payload.announcement_id,
            payload.academic_year_id,
            payload.application_type,
            &payload.documents,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationDetailResponse::new(application, documents)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/applications/me",
    responses(
        (status = 200, description = "Applications of the current user"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    let applications = state
        .application_service
        .list_by_candidate(principal.id)
        .await?;
    let response: Vec<ApplicationDetailResponse> = applications
        .into_iter()
        .map(|(application, documents)| ApplicationDetailResponse::new(application, documents))
        .collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application with its documents", body = Json<ApplicationDetailResponse>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    let (application, documents) = state.application_service.get_with_documents(id).await?;
    ensure_owner_or_admin(&principal, application.candidate_id)?;
    Ok(Json(ApplicationDetailResponse::new(application, documents)))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateApplicationPayload,
    responses(
        (status = 200, description = "Application updated", body = Json<ApplicationDetailResponse>),
        (status = 400, description = "Window closed or application locked"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let principal = claims.principal()?;
    let (application, documents) = state
        .application_service
        .update(id, &principal, payload.application_type, &payload.documents)
        .await?;
    Ok(Json(ApplicationDetailResponse::new(application, documents)))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 204, description = "Application cancelled and removed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn cancel_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    state.application_service.cancel(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}/documents/{document_id}",
    params(
        ("id" = Uuid, Path, description = "Application ID"),
        ("document_id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Document detached"),
        (status = 400, description = "Application locked or document mismatch"),
        (status = 404, description = "Application or document not found")
    )
)]
#[axum::debug_handler]
pub async fn remove_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, document_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    state
        .application_service
        .remove_document(id, document_id, &principal)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/complete",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Completeness of the application", body = Json<CompletenessResponse>),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_completeness(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    let (application, _) = state.application_service.get_with_documents(id).await?;
    ensure_owner_or_admin(&principal, application.candidate_id)?;
    let complete = state.application_service.is_complete(id).await?;
    Ok(Json(CompletenessResponse { complete }))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = StatusUpdatePayload,
    responses(
        (status = 200, description = "Status updated", body = Json<ApplicationResponse>),
        (status = 400, description = "Invalid or locked transition"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdatePayload>,
) -> Result<impl IntoResponse> {
    let principal = claims.principal()?;
    let application = state
        .application_service
        .transition(id, payload.status, &principal, payload.comments.as_deref())
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{id}/applications",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Applications submitted to the announcement"),
        (status = 404, description = "Announcement not found")
    )
)]
#[axum::debug_handler]
pub async fn list_by_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let applications = state.application_service.list_by_announcement(id).await?;
    let response: Vec<ApplicationDetailResponse> = applications
        .into_iter()
        .map(|(application, documents)| ApplicationDetailResponse::new(application, documents))
        .collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/history",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Status transition history"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let history = state.application_service.list_history(id).await?;
    Ok(Json(history))
}
