mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::db::DBClient;
use crate::mail::sendmail::Mailer;
use service::{
    dispute::DisputeService, escrow::EscrowService, notification::NotificationService,
    order::OrderService, payment::PaymentService, paymob::PaymobClient, review::ReviewService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub mailer: Option<Arc<Mailer>>,
    pub escrow_service: Arc<EscrowService>,
    pub notification_service: Arc<NotificationService>,
    pub order_service: Arc<OrderService>,
    pub payment_service: Arc<PaymentService>,
    pub dispute_service: Arc<DisputeService>,
    pub review_service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config, mailer: Option<Mailer>) -> Self {
        let db_client = Arc::new(db_client);
        let mailer = mailer.map(Arc::new);

        let escrow_service = Arc::new(EscrowService::new(db_client.clone()));
        let notification_service = Arc::new(NotificationService::new(
            db_client.clone(),
            mailer.clone(),
        ));

        let order_service = Arc::new(OrderService::new(
            db_client.clone(),
            (*escrow_service).clone(),
            (*notification_service).clone(),
        ));
        let dispute_service = Arc::new(DisputeService::new(
            db_client.clone(),
            (*escrow_service).clone(),
            (*notification_service).clone(),
        ));
        let review_service = Arc::new(ReviewService::new(
            db_client.clone(),
            (*notification_service).clone(),
        ));

        let paymob = PaymobClient::new(&config);
        let payment_service = Arc::new(PaymentService::new(db_client.clone(), paymob));

        Self {
            env: config,
            db_client,
            mailer,
            escrow_service,
            notification_service,
            order_service,
            payment_service,
            dispute_service,
            review_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let mailer = match Mailer::new(&config) {
        Ok(mailer) => Some(mailer),
        Err(e) => {
            tracing::warn!("mailer disabled: {}", e);
            None
        }
    };

    let allowed_origins = vec![
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ]);

    let app_state = Arc::new(AppState::new(db_client, config.clone(), mailer));

    let app = create_router(app_state.clone()).layer(cors);

    let app_state_clone = app_state.clone();
    tokio::spawn(async move {
        service::background_jobs::start_auto_release_job(app_state_clone).await;
    });

    let app_state_clone = app_state.clone();
    tokio::spawn(async move {
        service::background_jobs::start_token_cleanup_job(app_state_clone).await;
    });

    tracing::info!("server listening on 0.0.0.0:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
