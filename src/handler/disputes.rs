use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::disputedtos::*,
    error::HttpError,
    middleware::role_check,
    middleware::JWTAuthMiddeware,
    models::disputemodel::{DisputeResolution, DisputeStatus},
    models::usermodel::UserRole,
    AppState,
};

pub fn disputes_handler() -> Router {
    let admin = Router::new()
        .route("/", get(list_disputes))
        .route("/:dispute_id/resolve", post(resolve_dispute))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }));

    Router::new()
        .route("/orders/:order_id", post(open_dispute))
        .route("/:dispute_id", get(get_dispute))
        .route("/:dispute_id/respond", post(respond))
        .merge(admin)
}

fn parse_status(raw: &str) -> Result<DisputeStatus, HttpError> {
    match raw {
        "open" => Ok(DisputeStatus::Open),
        "in_review" => Ok(DisputeStatus::InReview),
        "resolved" => Ok(DisputeStatus::Resolved),
        other => Err(HttpError::bad_request(format!(
            "Invalid dispute status: {}",
            other
        ))),
    }
}

fn parse_resolution(raw: &str) -> Result<DisputeResolution, HttpError> {
    match raw {
        "pay_technician" => Ok(DisputeResolution::PayTechnician),
        "refund_client" => Ok(DisputeResolution::RefundClient),
        "split_payment" => Ok(DisputeResolution::SplitPayment),
        other => Err(HttpError::bad_request(format!(
            "Invalid resolution: {}",
            other
        ))),
    }
}

pub async fn open_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<OpenDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .open_dispute(&user.user, order_id, body.argument)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DisputeResponseDto {
            status: "success".to_string(),
            dispute,
        }),
    ))
}

pub async fn respond(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<DisputeArgumentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .respond(&user.user, dispute_id, body.argument)
        .await?;

    Ok(Json(DisputeResponseDto {
        status: "success".to_string(),
        dispute,
    }))
}

pub async fn get_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let dispute = app_state
        .dispute_service
        .get_dispute(&user.user, dispute_id)
        .await?;

    Ok(Json(DisputeResponseDto {
        status: "success".to_string(),
        dispute,
    }))
}

pub async fn list_disputes(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<DisputeQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let status = query.status.as_deref().map(parse_status).transpose()?;
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let disputes = app_state
        .dispute_service
        .list_disputes(status, page as u32, limit)
        .await?;

    Ok(Json(DisputeListResponseDto {
        status: "success".to_string(),
        results: disputes.len(),
        disputes,
    }))
}

pub async fn resolve_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<ResolveDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let resolution = parse_resolution(&body.resolution)?;

    let dispute = app_state
        .dispute_service
        .resolve(dispute_id, resolution, body.admin_notes, body.technician_share)
        .await?;

    Ok(Json(DisputeResponseDto {
        status: "success".to_string(),
        dispute,
    }))
}
