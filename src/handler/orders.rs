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
    dtos::{orderdtos::*, userdtos::RequestQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::ordermodel::OrderType,
    service::order::NewOrder,
    AppState,
};

pub fn orders_handler() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/open", get(list_open_requests))
        .route("/:order_id", get(get_order))
        .route("/:order_id/offers", post(submit_offer).get(list_offers))
        .route("/offers/:offer_id/accept", post(accept_offer))
        .route("/:order_id/start", post(start_job))
        .route("/:order_id/done", post(mark_job_done))
        .route("/:order_id/release", post(release_funds))
        .route("/:order_id/cancel", post(cancel_order))
}

fn parse_order_type(raw: &str) -> Result<OrderType, HttpError> {
    match raw {
        "direct_hire" => Ok(OrderType::DirectHire),
        "service_request" => Ok(OrderType::ServiceRequest),
        other => Err(HttpError::bad_request(format!(
            "Invalid order type: {}",
            other
        ))),
    }
}

pub async fn create_order(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateOrderDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let order_type = parse_order_type(&body.order_type)?;

    let order = app_state
        .order_service
        .create_order(
            &user.user,
            NewOrder {
                service_id: body.service_id,
                order_type,
                technician_id: body.technician_id,
                problem_description: body.problem_description,
                requested_location: body.requested_location,
                scheduled_date: body.scheduled_date,
                scheduled_time_start: body.scheduled_time_start,
                scheduled_time_end: body.scheduled_time_end,
                expected_price: body.expected_price,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponseDto {
            status: "success".to_string(),
            order,
        }),
    ))
}

pub async fn list_orders(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let orders = app_state
        .order_service
        .list_orders(&user.user, page as u32, limit)
        .await?;

    Ok(Json(OrderListResponseDto {
        status: "success".to_string(),
        results: orders.len(),
        orders,
    }))
}

pub async fn list_open_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let orders = app_state
        .order_service
        .list_open_requests(&user.user, page as u32, limit)
        .await?;

    Ok(Json(OrderListResponseDto {
        status: "success".to_string(),
        results: orders.len(),
        orders,
    }))
}

pub async fn get_order(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state.order_service.get_order(&user.user, order_id).await?;

    Ok(Json(OrderResponseDto {
        status: "success".to_string(),
        order,
    }))
}

pub async fn submit_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<SubmitOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let offer = app_state
        .order_service
        .submit_offer(
            &user.user,
            order_id,
            body.offered_price,
            body.offer_description,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OfferResponseDto {
            status: "success".to_string(),
            offer,
        }),
    ))
}

pub async fn list_offers(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let offers = app_state
        .order_service
        .list_offers(&user.user, order_id)
        .await?;

    Ok(Json(OfferListResponseDto {
        status: "success".to_string(),
        results: offers.len(),
        offers,
    }))
}

pub async fn accept_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(offer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state
        .order_service
        .accept_offer(&user.user, offer_id)
        .await?;

    Ok(Json(OrderResponseDto {
        status: "success".to_string(),
        order,
    }))
}

pub async fn start_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state.order_service.start_job(&user.user, order_id).await?;

    Ok(Json(OrderResponseDto {
        status: "success".to_string(),
        order,
    }))
}

pub async fn mark_job_done(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state
        .order_service
        .mark_job_done(&user.user, order_id)
        .await?;

    Ok(Json(OrderResponseDto {
        status: "success".to_string(),
        order,
    }))
}

pub async fn release_funds(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state
        .order_service
        .release_funds(&user.user, order_id)
        .await?;

    Ok(Json(OrderResponseDto {
        status: "success".to_string(),
        order,
    }))
}

pub async fn cancel_order(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state
        .order_service
        .cancel_order(&user.user, order_id)
        .await?;

    Ok(Json(OrderResponseDto {
        status: "success".to_string(),
        order,
    }))
}
