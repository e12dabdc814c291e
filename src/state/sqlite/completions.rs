use super::*;

fn row_to_completion(r: &sqlx::sqlite::SqliteRow) -> DailyCompletion {
    DailyCompletion {
        id: r.get("id"),
        subgoal_id: r.get("subgoal_id"),
        completed_on: r.get("completed_on"),
        completed: r.get("completed"),
        completed_at: r.get("completed_at"),
    }
}

#[async_trait]
impl crate::traits::CompletionStore for SqliteStateStore {
    async fn get_subgoal_for_user(
        &self,
        subgoal_id: i64,
        user_id: i64,
    ) -> anyhow::Result<Option<SubGoal>> {
        let row = sqlx::query(
            "SELECT sg.id, sg.goal_id, sg.name, sg.weight, sg.created_at
             FROM subgoals sg
             JOIN goals g ON g.id = sg.goal_id
             WHERE sg.id = ? AND g.user_id = ?",
        )
        .bind(subgoal_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SubGoal {
            id: r.get("id"),
            goal_id: r.get("goal_id"),
            name: r.get("name"),
            weight: r.get("weight"),
            created_at: r.get("created_at"),
        }))
    }

    async fn get_completion(
        &self,
        subgoal_id: i64,
        completed_on: NaiveDate,
    ) -> anyhow::Result<Option<DailyCompletion>> {
        let row = sqlx::query(
            "SELECT id, subgoal_id, completed_on, completed, completed_at
             FROM subgoal_daily_completion
             WHERE subgoal_id = ? AND completed_on = ?",
        )
        .bind(subgoal_id)
        .bind(completed_on)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_completion(&r)))
    }

    async fn insert_completion(
        &self,
        subgoal_id: i64,
        completed_on: NaiveDate,
    ) -> anyhow::Result<DailyCompletion> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO subgoal_daily_completion (subgoal_id, completed_on, completed, completed_at)
             VALUES (?, ?, 1, ?)",
        )
        .bind(subgoal_id)
        .bind(completed_on)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(DailyCompletion {
            id: result.last_insert_rowid(),
            subgoal_id,
            completed_on,
            completed: true,
            completed_at: now,
        })
    }
}
