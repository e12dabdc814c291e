use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::auth::TOKEN_TYPE;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// 302 to Google's consent screen.
pub async fn google_login(State(state): State<AppState>) -> Response {
    let url = state.sso.authorize_url();
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<Value>, ApiError> {
    let code = query
        .code
        .ok_or_else(|| ApiError::bad_request("Missing code"))?;

    let bundle = state.sso.handle_callback(&code).await?;
    // Unlike password login, the callback response carries no user_id.
    Ok(Json(json!({
        "access_token": bundle.access_token,
        "refresh_token": bundle.refresh_token,
        "token_type": TOKEN_TYPE,
    })))
}
