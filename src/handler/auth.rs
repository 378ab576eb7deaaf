use std::sync::Arc;

use axum::{
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::*,
    error::{ErrorMessage, HttpError},
    mail::mails::{send_forgot_password_email, send_verification_email, send_welcome_email},
    models::usermodel::{AccountStatus, UserRole},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", get(verify_email))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

fn generate_email_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let role = match body.role.as_deref() {
        None | Some("client") => UserRole::Client,
        Some("technician") => UserRole::Technician,
        Some(other) => {
            return Err(HttpError::bad_request(format!("Invalid role: {}", other)));
        }
    };

    let existing = app_state
        .db_client
        .get_user(None, Some(&body.email), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if existing.is_some() {
        return Err(HttpError::conflict(ErrorMessage::EmailExist.to_string()));
    }

    let hashed_password =
        password::hash(&body.password).map_err(|e| HttpError::server_error(e.to_string()))?;

    let verification_token = generate_email_token();
    let expires_at = Utc::now() + Duration::hours(24);

    let user = app_state
        .db_client
        .save_user(
            body.first_name.clone(),
            body.last_name.clone(),
            body.email.clone(),
            hashed_password,
            role,
            body.phone_number.clone(),
            verification_token.clone(),
            expires_at,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(mailer) = app_state.mailer.clone() {
        let app_url = app_state.env.app_url.clone();
        let email = user.email.clone();
        let first_name = user.first_name.clone();
        tokio::spawn(async move {
            if let Err(e) =
                send_verification_email(&mailer, &email, &first_name, &app_url, &verification_token)
                    .await
            {
                tracing::warn!("verification email failed: {}", e);
            }
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(Response {
            status: "success",
            message: "Registration successful! Please check your email to verify your account."
                .to_string(),
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&body.email), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;
    if !password_matched {
        return Err(HttpError::unauthorized(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    if user.account_status != AccountStatus::Active {
        return Err(HttpError::forbidden(
            "Your account is suspended or deactivated".to_string(),
        ));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(time::Duration::minutes(app_state.env.jwt_maxage))
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build cookie".to_string()))?,
    );

    let response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
    });

    Ok((headers, response))
}

pub async fn verify_email(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<VerifyEmailQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user(None, None, Some(&query.token))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    if let Some(expires_at) = user.token_expires_at {
        if expires_at < Utc::now() {
            return Err(HttpError::unauthorized(
                "Verification token has expired".to_string(),
            ));
        }
    }

    app_state
        .db_client
        .mark_email_verified(&query.token)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(mailer) = app_state.mailer.clone() {
        let email = user.email.clone();
        let first_name = user.first_name.clone();
        tokio::spawn(async move {
            if let Err(e) = send_welcome_email(&mailer, &email, &first_name).await {
                tracing::warn!("welcome email failed: {}", e);
            }
        });
    }

    Ok(Json(Response {
        status: "success",
        message: "Email verified successfully".to_string(),
    }))
}

pub async fn forgot_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ForgotPasswordDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // Always answer the same way so the endpoint cannot enumerate emails.
    let response = Json(Response {
        status: "success",
        message: "If that email exists, a password reset link has been sent".to_string(),
    });

    let Some(user) = app_state
        .db_client
        .get_user(None, Some(&body.email), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
    else {
        return Ok(response);
    };

    let reset_token = generate_email_token();
    let expires_at = Utc::now() + Duration::minutes(30);

    app_state
        .db_client
        .set_verification_token(user.id, &reset_token, expires_at)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(mailer) = app_state.mailer.clone() {
        let reset_link = format!(
            "{}/reset-password?token={}",
            app_state.env.app_url, reset_token
        );
        let email = user.email.clone();
        let first_name = user.first_name.clone();
        tokio::spawn(async move {
            if let Err(e) =
                send_forgot_password_email(&mailer, &email, &first_name, &reset_link).await
            {
                tracing::warn!("password reset email failed: {}", e);
            }
        });
    }

    Ok(response)
}

pub async fn reset_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ResetPasswordDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, None, Some(&body.token))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    if let Some(expires_at) = user.token_expires_at {
        if expires_at < Utc::now() {
            return Err(HttpError::unauthorized(
                "Reset token has expired".to_string(),
            ));
        }
    }

    let hashed_password =
        password::hash(&body.new_password).map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .update_user_password(user.id, hashed_password)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .clear_verification_token(user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(Response {
        status: "success",
        message: "Password has been reset. You can now log in.".to_string(),
    }))
}
