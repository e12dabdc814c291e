use sqlx::SqlitePool;
use tracing::info;

/// Centralized database migrations for all SQLite-backed stores.
///
/// Each migration is safe to call multiple times (idempotent) via
/// `IF NOT EXISTS`. Foreign keys are declared with `ON DELETE CASCADE` so
/// deleting a user removes its goals, sub-goals, completions, and provider
/// links in one statement; `PRAGMA foreign_keys = ON` is set per connection
/// by the pool options.
pub(crate) async fn run_all(pool: &SqlitePool) -> anyhow::Result<()> {
    migrate_auth(pool).await?;
    migrate_goals(pool).await?;
    Ok(())
}

pub(crate) async fn migrate_auth(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_auth_providers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            provider TEXT NOT NULL,
            provider_user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (provider, provider_user_id),
            UNIQUE (user_id, provider)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Auth tables migration complete");
    Ok(())
}

pub(crate) async fn migrate_goals(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            total_days INTEGER NOT NULL CHECK (total_days > 0),
            start_date TEXT NOT NULL,
            current_streak INTEGER NOT NULL DEFAULT 0,
            longest_streak INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subgoals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            goal_id INTEGER NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            weight REAL NOT NULL DEFAULT 1.0 CHECK (weight > 0),
            created_at TEXT NOT NULL,
            UNIQUE (goal_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subgoal_daily_completion (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subgoal_id INTEGER NOT NULL REFERENCES subgoals(id) ON DELETE CASCADE,
            completed_on TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 1,
            completed_at TEXT NOT NULL,
            UNIQUE (subgoal_id, completed_on)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Ledger reads are always "this sub-goal, this day" or "all days for a
    // sub-goal ordered by date".
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_completion_subgoal_day
         ON subgoal_daily_completion(subgoal_id, completed_on DESC)",
    )
    .execute(pool)
    .await?;

    info!("Goal tables migration complete");
    Ok(())
}
