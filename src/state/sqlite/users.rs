use super::*;

fn row_to_user(r: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
        password_hash: r.get("password_hash"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn row_to_link(r: &sqlx::sqlite::SqliteRow) -> AuthProviderLink {
    AuthProviderLink {
        id: r.get("id"),
        user_id: r.get("user_id"),
        provider: r.get("provider"),
        provider_user_id: r.get("provider_user_id"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl crate::traits::UserStore for SqliteStateStore {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl crate::traits::AuthProviderStore for SqliteStateStore {
    async fn create_provider_link(
        &self,
        user_id: i64,
        provider: &str,
        provider_user_id: &str,
    ) -> anyhow::Result<AuthProviderLink> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO user_auth_providers (user_id, provider, provider_user_id, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(provider)
        .bind(provider_user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(AuthProviderLink {
            id: result.last_insert_rowid(),
            user_id,
            provider: provider.to_string(),
            provider_user_id: provider_user_id.to_string(),
            created_at: now,
        })
    }

    async fn get_provider_link(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> anyhow::Result<Option<AuthProviderLink>> {
        let row = sqlx::query(
            "SELECT id, user_id, provider, provider_user_id, created_at
             FROM user_auth_providers WHERE provider = ? AND provider_user_id = ?",
        )
        .bind(provider)
        .bind(provider_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_link(&r)))
    }

    async fn list_provider_links_for_user(
        &self,
        user_id: i64,
    ) -> anyhow::Result<Vec<AuthProviderLink>> {
        let rows = sqlx::query(
            "SELECT id, user_id, provider, provider_user_id, created_at
             FROM user_auth_providers WHERE user_id = ? ORDER BY provider ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_link).collect())
    }
}
