use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        paymentdtos::*,
        userdtos::{RequestQueryDto, Response},
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn payments_handler() -> Router {
    Router::new()
        .route("/deposit", post(initiate_deposit))
        .route("/deposit/saved-card", post(deposit_with_saved_card))
        .route("/transactions", get(list_transactions))
        .route("/transactions/:reference", get(get_transaction))
        .route("/methods", get(list_payment_methods))
        .route("/methods/:method_id/default", put(set_default_method))
        .route("/methods/:method_id", delete(delete_method))
}

/// The gateway calls this without a session, so it lives outside the auth
/// layer. Authenticity comes from the HMAC query parameter instead.
pub fn webhook_handler() -> Router {
    Router::new().route("/webhook", post(paymob_webhook))
}

pub async fn initiate_deposit(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<InitiateDepositDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let initiation = app_state
        .payment_service
        .initiate_deposit(&user.user, body.amount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DepositResponseDto {
            status: "success".to_string(),
            reference: initiation.transaction.reference,
            iframe_url: initiation.iframe_url,
        }),
    ))
}

pub async fn deposit_with_saved_card(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<InitiateDepositDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let transaction = app_state
        .payment_service
        .deposit_with_saved_card(&user.user, body.amount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponseDto {
            status: "success".to_string(),
            transaction,
        }),
    ))
}

pub async fn paymob_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<WebhookQueryDto>,
    Json(body): Json<PaymobWebhookDto>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .payment_service
        .handle_webhook(&body.event_type, &body.obj, &query.hmac)
        .await?;

    Ok(Json(Response {
        status: "success",
        message: "Webhook processed".to_string(),
    }))
}

pub async fn list_transactions(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let transactions = app_state
        .payment_service
        .get_transactions(user.user.id, page as u32, limit)
        .await?;

    Ok(Json(TransactionListResponseDto {
        status: "success".to_string(),
        results: transactions.len(),
        transactions,
    }))
}

pub async fn get_transaction(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let transaction = app_state
        .payment_service
        .get_transaction_by_reference(user.user.id, &reference)
        .await?;

    Ok(Json(TransactionResponseDto {
        status: "success".to_string(),
        transaction,
    }))
}

pub async fn list_payment_methods(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let payment_methods = app_state
        .payment_service
        .list_payment_methods(user.user.id)
        .await?;

    Ok(Json(PaymentMethodListResponseDto {
        status: "success".to_string(),
        payment_methods,
    }))
}

pub async fn set_default_method(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(method_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payment_method = app_state
        .payment_service
        .set_default_payment_method(user.user.id, method_id)
        .await?;

    Ok(Json(PaymentMethodResponseDto {
        status: "success".to_string(),
        payment_method,
    }))
}

pub async fn delete_method(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(method_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .payment_service
        .delete_payment_method(user.user.id, method_id)
        .await?;

    Ok(Json(Response {
        status: "success",
        message: "Payment method removed".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both routers mount under /payments: the gateway callback must not
    // collide with the authenticated payment routes.
    #[test]
    fn webhook_route_coexists_with_payment_routes() {
        let _router: Router = Router::new()
            .nest("/payments", payments_handler())
            .nest("/payments", webhook_handler());
    }
}
