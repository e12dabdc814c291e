use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AppState, AuthUser};
use crate::auth::TOKEN_TYPE;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;
    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let bundle = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(json!({
        "access_token": bundle.access_token,
        "refresh_token": bundle.refresh_token,
        "token_type": TOKEN_TYPE,
        "user_id": bundle.user_id,
    })))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<Value>, ApiError> {
    let access_token = state.auth.refresh_access(&req.refresh_token)?;
    Ok(Json(json!({
        "access_token": access_token,
        "token_type": TOKEN_TYPE,
    })))
}

pub async fn set_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<SetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state.auth.set_password(&user, &req.password).await?;
    Ok(Json(json!({"message": "Password set successfully"})))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<Value> {
    Json(json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
    }))
}
