use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::errors::{is_unique_violation, ApiError};
use crate::traits::store_prelude::*;
use crate::traits::{Goal, NewGoal, NewSubGoal, SubGoal, User};

/// Result of a completion request. Marking the same sub-goal twice on one
/// day is a success, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Marked,
    AlreadyCompleted,
}

impl CompletionOutcome {
    pub fn message(self) -> &'static str {
        match self {
            CompletionOutcome::Marked => "Sub-goal marked as completed",
            CompletionOutcome::AlreadyCompleted => "Already completed for this day",
        }
    }
}

/// Goal and sub-goal management plus the daily completion ledger. Every
/// operation is scoped to the calling user; ownership misses read the same
/// as missing rows.
#[derive(Clone)]
pub struct GoalService {
    store: Arc<dyn StateStore + Send + Sync>,
}

impl GoalService {
    pub fn new(store: Arc<dyn StateStore + Send + Sync>) -> Self {
        Self { store }
    }

    pub async fn create_goal(
        &self,
        user: &User,
        title: &str,
        total_days: i64,
        start_date: NaiveDate,
    ) -> Result<Goal, ApiError> {
        let title_len = title.chars().count();
        if !(1..=255).contains(&title_len) {
            return Err(ApiError::validation(
                "Title must be between 1 and 255 characters",
            ));
        }
        if total_days <= 0 {
            return Err(ApiError::validation("total_days must be greater than 0"));
        }

        Ok(self
            .store
            .create_goal(&NewGoal {
                user_id: user.id,
                title: title.to_string(),
                total_days,
                start_date,
            })
            .await?)
    }

    pub async fn create_subgoal(
        &self,
        user: &User,
        goal_id: i64,
        name: &str,
        weight: f64,
    ) -> Result<SubGoal, ApiError> {
        let name_len = name.chars().count();
        if !(1..=255).contains(&name_len) {
            return Err(ApiError::validation(
                "Name must be between 1 and 255 characters",
            ));
        }
        if weight <= 0.0 {
            return Err(ApiError::validation("weight must be greater than 0"));
        }

        let goal = self
            .store
            .get_goal_for_user(goal_id, user.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Goal not found"))?;

        match self
            .store
            .create_subgoal(&NewSubGoal {
                goal_id: goal.id,
                name: name.to_string(),
                weight,
            })
            .await
        {
            Ok(subgoal) => Ok(subgoal),
            Err(e) if is_unique_violation(&e) => Err(ApiError::conflict(
                "Sub-goal with this name already exists for this goal",
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// All goals for the user, each with its sub-goal summaries.
    pub async fn list_goals(&self, user: &User) -> Result<Vec<(Goal, Vec<SubGoal>)>, ApiError> {
        let goals = self.store.list_goals_for_user(user.id).await?;
        let mut out = Vec::with_capacity(goals.len());
        for goal in goals {
            let subgoals = self.store.list_subgoals_for_goal(goal.id).await?;
            out.push((goal, subgoals));
        }
        Ok(out)
    }

    /// Record a sub-goal as done for one calendar day (today when no date is
    /// given). Idempotent: an existing ledger row short-circuits into
    /// `AlreadyCompleted` instead of inserting.
    pub async fn complete_subgoal(
        &self,
        user: &User,
        subgoal_id: i64,
        completed_on: Option<NaiveDate>,
    ) -> Result<CompletionOutcome, ApiError> {
        let subgoal = self
            .store
            .get_subgoal_for_user(subgoal_id, user.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Sub-goal not found"))?;

        let day = completed_on.unwrap_or_else(|| Local::now().date_naive());

        if self.store.get_completion(subgoal.id, day).await?.is_some() {
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        self.store.insert_completion(subgoal.id, day).await?;
        Ok(CompletionOutcome::Marked)
    }
}
