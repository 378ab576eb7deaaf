use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{reviewdtos::*, userdtos::RequestQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new()
        .route("/orders/:order_id", post(submit_review))
        .route("/technicians/:technician_id", get(list_reviews))
}

pub async fn submit_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<SubmitReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let review = app_state
        .review_service
        .submit_review(&user.user, order_id, body.rating, body.comment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponseDto {
            status: "success".to_string(),
            review,
        }),
    ))
}

pub async fn list_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(technician_id): Path<Uuid>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let reviews = app_state
        .review_service
        .get_reviews_for_user(technician_id, page as u32, limit)
        .await?;

    Ok(Json(ReviewListResponseDto {
        status: "success".to_string(),
        results: reviews.len(),
        reviews,
    }))
}
