use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::auth::AuthService;
use crate::errors::ApiError;
use crate::goals::GoalService;
use crate::sso::GoogleSso;
use crate::traits::User;

mod auth_routes;
mod goal_routes;
mod sso_routes;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub goals: GoalService,
    pub sso: GoogleSso,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(auth_routes::register))
        .route("/auth/login", post(auth_routes::login))
        .route("/auth/refresh", post(auth_routes::refresh))
        .route("/auth/set-password", post(auth_routes::set_password))
        .route("/auth/me", get(auth_routes::me))
        .route("/auth/google/login", get(sso_routes::google_login))
        .route("/auth/google/callback", get(sso_routes::google_callback))
        .route(
            "/goals",
            post(goal_routes::create_goal).get(goal_routes::list_goals),
        )
        .route(
            "/goals/{goal_id}/subgoals",
            post(goal_routes::create_subgoal),
        )
        .route(
            "/subgoals/{subgoal_id}/complete",
            post(goal_routes::complete_subgoal),
        )
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

// ---------------------------------------------------------------------------
// Bearer auth
// ---------------------------------------------------------------------------

/// Extractor for protected routes: parses the bearer token, verifies it, and
/// loads the calling user. Missing or invalid credentials reject with 401
/// before the handler runs.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");

        let user = state.auth.resolve_current_user(token).await?;
        Ok(AuthUser(user))
    }
}
