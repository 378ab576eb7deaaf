use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler, chat::chat_handler, disputes::disputes_handler,
        notifications::notifications_handler, orders::orders_handler,
        payments::{payments_handler, webhook_handler},
        reviews::reviews_handler,
        services::{services_admin_handler, services_handler},
        technicians::technicians_handler, users::users_handler,
    },
    middleware::auth,
    AppState,
};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .nest("/users", users_handler())
        .nest("/admin/services", services_admin_handler())
        .nest("/orders", orders_handler())
        .nest("/payments", payments_handler())
        .nest("/chat", chat_handler())
        .nest("/reviews", reviews_handler())
        .nest("/disputes", disputes_handler())
        .nest("/notifications", notifications_handler())
        .nest("/technicians", technicians_handler())
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/payments", webhook_handler())
        .nest("/services", services_handler())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}

async fn health_check() -> &'static str {
    "ok"
}
