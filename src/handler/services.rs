use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::servicedb::ServiceExt,
    dtos::{servicedtos::*, userdtos::Response},
    error::HttpError,
    middleware::role_check,
    models::usermodel::UserRole,
    AppState,
};

/// Public catalog reads. Anyone can browse categories and services.
pub fn services_handler() -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/", get(list_services))
        .route("/:service_id", get(get_service))
        .route("/:service_id/quote", get(get_quote))
}

/// Catalog management, mounted behind the auth layer.
pub fn services_admin_handler() -> Router {
    Router::new()
        .route("/categories", post(create_category))
        .route("/categories/:category_id", delete(delete_category))
        .route("/", post(create_service))
        .route("/:service_id", delete(delete_service))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }))
}

pub async fn list_categories(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let categories = app_state
        .db_client
        .get_categories()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(CategoryListResponseDto {
        status: "success".to_string(),
        categories,
    }))
}

pub async fn create_category(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateCategoryDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let category = app_state
        .db_client
        .create_category(body.category_name, body.description, body.icon_url)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponseDto {
            status: "success".to_string(),
            category,
        }),
    ))
}

pub async fn delete_category(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted = app_state
        .db_client
        .delete_category(category_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if deleted == 0 {
        return Err(HttpError::not_found("Category not found".to_string()));
    }

    Ok(Json(Response {
        status: "success",
        message: "Category deleted".to_string(),
    }))
}

pub async fn list_services(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ServiceQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let services = app_state
        .db_client
        .get_services(query.category_id, page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ServiceListResponseDto {
        status: "success".to_string(),
        results: services.len(),
        services,
    }))
}

pub async fn get_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found".to_string()))?;

    Ok(Json(ServiceResponseDto {
        status: "success".to_string(),
        service,
    }))
}

pub async fn get_quote(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
    Query(query): Query<QuoteQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found".to_string()))?;

    let emergency = query.emergency.unwrap_or(false);
    let quote = if emergency {
        service.emergency_quote()
    } else {
        service.base_inspection_fee.clone().with_scale(2)
    };

    Ok(Json(QuoteResponseDto {
        status: "success".to_string(),
        service_id: service.id,
        emergency,
        inspection_fee: quote,
    }))
}

pub async fn create_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateServiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let category = app_state
        .db_client
        .get_category_by_id(body.category_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if category.is_none() {
        return Err(HttpError::not_found("Category not found".to_string()));
    }

    let service = app_state
        .db_client
        .create_service(
            body.category_id,
            body.service_name,
            body.description,
            body.service_type,
            body.base_inspection_fee,
            body.estimated_price_min,
            body.estimated_price_max,
            body.emergency_surcharge_percentage,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ServiceResponseDto {
            status: "success".to_string(),
            service,
        }),
    ))
}

pub async fn delete_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted = app_state
        .db_client
        .delete_service(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if deleted == 0 {
        return Err(HttpError::not_found("Service not found".to_string()));
    }

    Ok(Json(Response {
        status: "success",
        message: "Service deleted".to_string(),
    }))
}
