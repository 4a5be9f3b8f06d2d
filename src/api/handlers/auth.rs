use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    api::models::{
        auth::{AuthResponse, LoginRequest, LogoutQuery, LogoutResponse, RegisterRequest},
        users::{CurrentUser, UserResponse},
    },
    auth::service::{self, Credentials, Registration},
    errors::Error,
    AppState,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or username already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    validate_password(&state, &request.password)?;

    let session = service::register(
        &state.db,
        Registration {
            email: request.email,
            username: request.username,
            password: request.password,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(session.user),
            access_token: session.token,
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>, Error> {
    let session = service::login(
        &state.db,
        Credentials {
            email: request.email,
            password: request.password,
        },
    )
    .await?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(session.user),
        access_token: session.token,
    }))
}

/// Logout: revoke the presented token, or with `?all=true` every access
/// token of the requester
#[utoipa::path(
    delete,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout result", body = LogoutResponse),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Invalid credential"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<LogoutQuery>,
    headers: HeaderMap,
) -> Json<LogoutResponse> {
    // The guard already validated this header; re-read it for the raw value
    let raw_token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .trim();

    let result = if query.all.unwrap_or(false) {
        service::logout_from_all_devices(&state.db, raw_token).await
    } else {
        service::logout(&state.db, raw_token).await
    };

    // Soft-failure contract: a storage error reports success=false instead
    // of an error response
    Json(match result {
        Ok(revoked) => LogoutResponse { success: true, revoked },
        Err(e) => {
            tracing::warn!("Logout could not complete: {e:#}");
            LogoutResponse { success: false, revoked: 0 }
        }
    })
}

fn validate_password(state: &AppState, password: &str) -> Result<(), Error> {
    let password_config = &state.config.auth.password;
    if password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }
    Ok(())
}
