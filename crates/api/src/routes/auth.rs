//! Authentication route handlers.
//!
//! Thin wrappers over [`AuthService`](crate::services::auth::AuthService):
//! decode the JSON body, call the service, wrap the result in the response
//! envelope.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::error::{ApiJson, Result, clear_sentry_user};
use crate::middleware::RequireAuth;
use crate::models::UserResponse;
use crate::routes::MessageResponse;
use crate::services::auth::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};
use crate::state::AppState;

/// `{message, user}`
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: &'static str,
    pub user: UserResponse,
}

/// `{message, token, user}`
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserResponse,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>)> {
    let user = state.auth().register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User registered successfully",
            user: UserResponse::from(&user),
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (issued, user) = state.auth().login(req).await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        token: issued.token,
        user: UserResponse::from(&user),
    }))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Json<MessageResponse> {
    state.auth().logout(&claims).await;
    clear_sentry_user();

    Json(MessageResponse {
        message: "Logged out successfully",
    })
}

/// `GET /api/auth/profile`
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<UserEnvelope>> {
    let user = state.auth().profile(claims.id).await?;

    Ok(Json(UserEnvelope {
        message: "Profile retrieved successfully",
        user: UserResponse::from(&user),
    }))
}

/// `PUT /api/auth/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserEnvelope>> {
    let user = state.auth().update_profile(claims.id, req).await?;

    Ok(Json(UserEnvelope {
        message: "Profile updated successfully",
        user: UserResponse::from(&user),
    }))
}

/// `PUT /api/auth/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    state.auth().change_password(claims.id, req).await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}
