use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user account. `password_hash` is `None` for SSO-only accounts; such an
/// account can gain a password later via the set-password flow, but no
/// operation ever removes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_sso_only(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Binds a user to one external identity. `(provider, provider_user_id)` is
/// globally unique; `(user_id, provider)` is unique so a user links at most
/// one identity per provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthProviderLink {
    pub id: i64,
    pub user_id: i64,
    pub provider: String,
    pub provider_user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A goal owned by one user. The streak counters are stored but not derived
/// from completions anywhere in this codebase; they stay at their defaults
/// until something external maintains them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub total_days: i64,
    pub start_date: NaiveDate,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A weighted sub-goal. `name` is unique within its goal; `weight` is the
/// relative contribution toward the goal's daily completion fraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubGoal {
    pub id: i64,
    pub goal_id: i64,
    pub name: String,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
}

/// One row per `(subgoal_id, completed_on)` — the source of truth for "was
/// this sub-goal done on this calendar day".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCompletion {
    pub id: i64,
    pub subgoal_id: i64,
    pub completed_on: NaiveDate,
    pub completed: bool,
    pub completed_at: DateTime<Utc>,
}

/// Field sets for inserts; the store assigns ids and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: String,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub user_id: i64,
    pub title: String,
    pub total_days: i64,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewSubGoal {
    pub goal_id: i64,
    pub name: String,
    pub weight: f64,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User>;
    async fn get_user(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> anyhow::Result<()>;
    /// Cascades to goals, sub-goals, completions, and provider links.
    async fn delete_user(&self, id: i64) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AuthProviderStore: Send + Sync {
    async fn create_provider_link(
        &self,
        user_id: i64,
        provider: &str,
        provider_user_id: &str,
    ) -> anyhow::Result<AuthProviderLink>;
    async fn get_provider_link(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> anyhow::Result<Option<AuthProviderLink>>;
    async fn list_provider_links_for_user(
        &self,
        user_id: i64,
    ) -> anyhow::Result<Vec<AuthProviderLink>>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn create_goal(&self, goal: &NewGoal) -> anyhow::Result<Goal>;
    /// Ownership-scoped lookup: returns None when the goal does not exist
    /// *or* belongs to a different user.
    async fn get_goal_for_user(&self, goal_id: i64, user_id: i64)
        -> anyhow::Result<Option<Goal>>;
    async fn list_goals_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Goal>>;
    /// Fails with a unique-constraint violation when `(goal_id, name)` exists.
    async fn create_subgoal(&self, subgoal: &NewSubGoal) -> anyhow::Result<SubGoal>;
    async fn list_subgoals_for_goal(&self, goal_id: i64) -> anyhow::Result<Vec<SubGoal>>;
}

#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Ownership enforced by joining through the owning goal.
    async fn get_subgoal_for_user(
        &self,
        subgoal_id: i64,
        user_id: i64,
    ) -> anyhow::Result<Option<SubGoal>>;
    async fn get_completion(
        &self,
        subgoal_id: i64,
        completed_on: NaiveDate,
    ) -> anyhow::Result<Option<DailyCompletion>>;
    async fn insert_completion(
        &self,
        subgoal_id: i64,
        completed_on: NaiveDate,
    ) -> anyhow::Result<DailyCompletion>;
}

/// `StateStore` is a facade (supertrait) used for trait objects, but Rust
/// still requires the defining trait to be in scope for method-call syntax —
/// import `store_prelude` in modules that call store methods.
pub trait StateStore: UserStore + AuthProviderStore + GoalStore + CompletionStore {}

impl<T: UserStore + AuthProviderStore + GoalStore + CompletionStore> StateStore for T {}

pub mod store_prelude {
    #![allow(unused_imports)]
    pub use super::{AuthProviderStore, CompletionStore, GoalStore, StateStore, UserStore};
}
