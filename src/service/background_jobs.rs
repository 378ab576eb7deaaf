use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::AppState;

/// Hourly sweep releasing escrows whose confirmation window has passed.
pub async fn start_auto_release_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(3600));

    loop {
        interval.tick().await;

        tracing::info!("running escrow auto-release job at {}", Utc::now());

        match app_state.order_service.process_auto_release().await {
            Ok(released) => {
                tracing::info!("auto-release job completed: {} orders released", released)
            }
            Err(e) => tracing::error!("auto-release job failed: {}", e),
        }
    }
}

/// Clears expired email verification tokens so they cannot be replayed.
pub async fn start_token_cleanup_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(21600));

    loop {
        interval.tick().await;

        match sqlx::query(
            r#"
            UPDATE users
            SET verification_token = NULL, token_expires_at = NULL
            WHERE verification_token IS NOT NULL
              AND token_expires_at < NOW()
            "#,
        )
        .execute(&app_state.db_client.pool)
        .await
        {
            Ok(result) => tracing::info!(
                "token cleanup completed: {} tokens cleared",
                result.rows_affected()
            ),
            Err(e) => tracing::error!("token cleanup failed: {}", e),
        }
    }
}
