use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AppState, AuthUser};
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct GoalCreateRequest {
    pub title: String,
    pub total_days: i64,
    pub start_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SubGoalCreateRequest {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct SubGoalCompleteRequest {
    pub completed_on: Option<NaiveDate>,
}

pub async fn create_goal(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<GoalCreateRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let goal = state
        .goals
        .create_goal(&user, &req.title, req.total_days, req.start_date)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": goal.id,
            "title": goal.title,
            "total_days": goal.total_days,
            "start_date": goal.start_date,
            "current_streak": goal.current_streak,
            "longest_streak": goal.longest_streak,
        })),
    ))
}

pub async fn list_goals(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let goals = state.goals.list_goals(&user).await?;
    let body: Vec<Value> = goals
        .iter()
        .map(|(goal, subgoals)| {
            json!({
                "id": goal.id,
                "title": goal.title,
                "total_days": goal.total_days,
                "start_date": goal.start_date,
                "current_streak": goal.current_streak,
                "longest_streak": goal.longest_streak,
                "subgoals": subgoals
                    .iter()
                    .map(|sg| json!({
                        "id": sg.id,
                        "name": sg.name,
                        "weight": sg.weight,
                    }))
                    .collect::<Vec<Value>>(),
            })
        })
        .collect();
    Ok(Json(json!(body)))
}

pub async fn create_subgoal(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(goal_id): Path<i64>,
    Json(req): Json<SubGoalCreateRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let subgoal = state
        .goals
        .create_subgoal(&user, goal_id, &req.name, req.weight)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": subgoal.id,
            "name": subgoal.name,
            "weight": subgoal.weight,
        })),
    ))
}

pub async fn complete_subgoal(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(subgoal_id): Path<i64>,
    Json(req): Json<SubGoalCompleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .goals
        .complete_subgoal(&user, subgoal_id, req.completed_on)
        .await?;
    Ok(Json(json!({"message": outcome.message()})))
}
