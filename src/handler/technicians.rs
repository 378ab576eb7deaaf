use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{techniciandb::TechnicianExt, userdb::UserExt},
    dtos::{
        techniciandtos::*,
        userdtos::{FilterUserDto, RequestQueryDto, Response},
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::technicianmodel::{DocumentStatus, TechnicianAvailability},
    models::usermodel::{UserRole, VerificationStatus},
    AppState,
};

pub fn technicians_handler() -> Router {
    let technician_only = Router::new()
        .route("/me/skills", post(add_skill))
        .route("/me/skills/:skill_id", delete(delete_skill))
        .route("/me/availability", post(add_availability))
        .route("/me/availability/:slot_id", delete(delete_availability))
        .route("/me/documents", post(submit_document).get(my_documents))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Technician])
        }));

    let admin_only = Router::new()
        .route("/documents/pending", get(pending_documents))
        .route("/documents/:document_id/review", put(review_document))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }));

    Router::new()
        .route("/", get(list_verified))
        .route("/:technician_id/skills", get(list_skills))
        .route("/:technician_id/availability", get(list_availability))
        .merge(technician_only)
        .merge(admin_only)
}

pub async fn list_verified(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let technicians = app_state
        .db_client
        .get_verified_technicians(page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(TechnicianListResponseDto {
        status: "success".to_string(),
        results: technicians.len(),
        technicians: FilterUserDto::filter_users(&technicians),
    }))
}

pub async fn add_skill(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<AddSkillDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let skill = app_state
        .db_client
        .add_skill(user.user.id, &body.skill_name, body.years_experience)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(SkillResponseDto {
            status: "success".to_string(),
            skill,
        }),
    ))
}

pub async fn list_skills(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(technician_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let skills = app_state
        .db_client
        .get_skills(technician_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(SkillListResponseDto {
        status: "success".to_string(),
        skills,
    }))
}

pub async fn delete_skill(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(skill_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted = app_state
        .db_client
        .delete_skill(user.user.id, skill_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if deleted == 0 {
        return Err(HttpError::not_found("Skill not found".to_string()));
    }

    Ok(Json(Response {
        status: "success",
        message: "Skill removed".to_string(),
    }))
}

pub async fn add_availability(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<AddAvailabilityDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.start_minute >= body.end_minute {
        return Err(HttpError::bad_request(
            "Start time must be before end time".to_string(),
        ));
    }

    let existing = app_state
        .db_client
        .get_availability(user.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let candidate = TechnicianAvailability {
        id: Uuid::nil(),
        technician_id: user.user.id,
        day_of_week: body.day_of_week,
        start_minute: body.start_minute,
        end_minute: body.end_minute,
        created_at: chrono::Utc::now(),
    };
    if existing.iter().any(|slot| slot.overlaps(&candidate)) {
        return Err(HttpError::conflict(
            "Slot overlaps an existing availability window".to_string(),
        ));
    }

    let slot = app_state
        .db_client
        .add_availability(
            user.user.id,
            body.day_of_week,
            body.start_minute,
            body.end_minute,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AvailabilityResponseDto {
            status: "success".to_string(),
            slot,
        }),
    ))
}

pub async fn list_availability(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(technician_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let slots = app_state
        .db_client
        .get_availability(technician_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(AvailabilityListResponseDto {
        status: "success".to_string(),
        slots,
    }))
}

pub async fn delete_availability(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(slot_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted = app_state
        .db_client
        .delete_availability(user.user.id, slot_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if deleted == 0 {
        return Err(HttpError::not_found("Availability slot not found".to_string()));
    }

    Ok(Json(Response {
        status: "success",
        message: "Availability slot removed".to_string(),
    }))
}

pub async fn submit_document(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<SubmitDocumentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let document = app_state
        .db_client
        .submit_document(user.user.id, &body.document_type, &body.document_url)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // A fresh submission puts the technician back under review.
    app_state
        .db_client
        .set_verification_status(user.user.id, VerificationStatus::Pending)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponseDto {
            status: "success".to_string(),
            document,
        }),
    ))
}

pub async fn my_documents(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let documents = app_state
        .db_client
        .get_documents(user.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(DocumentListResponseDto {
        status: "success".to_string(),
        documents,
    }))
}

pub async fn pending_documents(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let documents = app_state
        .db_client
        .get_pending_documents(page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(DocumentListResponseDto {
        status: "success".to_string(),
        documents,
    }))
}

pub async fn review_document(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    Path(document_id): Path<Uuid>,
    Json(body): Json<ReviewDocumentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (document_status, verification_status) = match body.status.as_str() {
        "approved" => (DocumentStatus::Approved, VerificationStatus::Approved),
        "rejected" => (DocumentStatus::Rejected, VerificationStatus::Rejected),
        other => {
            return Err(HttpError::bad_request(format!(
                "Invalid review status: {}",
                other
            )));
        }
    };

    let document = app_state
        .db_client
        .review_document(document_id, admin.user.id, document_status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| {
            HttpError::conflict("Document has already been reviewed".to_string())
        })?;

    app_state
        .db_client
        .set_verification_status(document.technician_id, verification_status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(DocumentResponseDto {
        status: "success".to_string(),
        document,
    }))
}
