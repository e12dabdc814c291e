use super::*;

fn row_to_goal(r: &sqlx::sqlite::SqliteRow) -> Goal {
    Goal {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        total_days: r.get("total_days"),
        start_date: r.get("start_date"),
        current_streak: r.get("current_streak"),
        longest_streak: r.get("longest_streak"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn row_to_subgoal(r: &sqlx::sqlite::SqliteRow) -> SubGoal {
    SubGoal {
        id: r.get("id"),
        goal_id: r.get("goal_id"),
        name: r.get("name"),
        weight: r.get("weight"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl crate::traits::GoalStore for SqliteStateStore {
    async fn create_goal(&self, goal: &NewGoal) -> anyhow::Result<Goal> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO goals (user_id, title, total_days, start_date,
                                current_streak, longest_streak, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, 0, ?, ?)",
        )
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(goal.total_days)
        .bind(goal.start_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Goal {
            id: result.last_insert_rowid(),
            user_id: goal.user_id,
            title: goal.title.clone(),
            total_days: goal.total_days,
            start_date: goal.start_date,
            current_streak: 0,
            longest_streak: 0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_goal_for_user(
        &self,
        goal_id: i64,
        user_id: i64,
    ) -> anyhow::Result<Option<Goal>> {
        let row = sqlx::query(
            "SELECT id, user_id, title, total_days, start_date,
                    current_streak, longest_streak, created_at, updated_at
             FROM goals WHERE id = ? AND user_id = ?",
        )
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_goal(&r)))
    }

    async fn list_goals_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Goal>> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, total_days, start_date,
                    current_streak, longest_streak, created_at, updated_at
             FROM goals WHERE user_id = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_goal).collect())
    }

    async fn create_subgoal(&self, subgoal: &NewSubGoal) -> anyhow::Result<SubGoal> {
        let now = Utc::now();
        // No .context() here: callers downcast to sqlx::Error to detect the
        // (goal_id, name) unique violation.
        let result = sqlx::query(
            "INSERT INTO subgoals (goal_id, name, weight, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(subgoal.goal_id)
        .bind(&subgoal.name)
        .bind(subgoal.weight)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(SubGoal {
            id: result.last_insert_rowid(),
            goal_id: subgoal.goal_id,
            name: subgoal.name.clone(),
            weight: subgoal.weight,
            created_at: now,
        })
    }

    async fn list_subgoals_for_goal(&self, goal_id: i64) -> anyhow::Result<Vec<SubGoal>> {
        let rows = sqlx::query(
            "SELECT id, goal_id, name, weight, created_at
             FROM subgoals WHERE goal_id = ? ORDER BY id ASC",
        )
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_subgoal).collect())
    }
}
