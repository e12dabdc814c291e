use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthService, TokenService};
use crate::config::AppConfig;
use crate::goals::GoalService;
use crate::server::{self, AppState};
use crate::sso::GoogleSso;
use crate::state::SqliteStateStore;
use crate::traits::StateStore;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    // 1. State store
    let store: Arc<dyn StateStore + Send + Sync> =
        Arc::new(SqliteStateStore::new(&config.state.db_path).await?);
    info!("State store initialized ({})", config.state.db_path);

    // 2. Token service
    let tokens = TokenService::new(&config.auth);

    // 3. Services — config is handed in at construction, nothing reads the
    // environment after this point.
    let auth = AuthService::new(store.clone(), tokens.clone());
    let goals = GoalService::new(store.clone());
    let sso = GoogleSso::new(config.google.clone(), store.clone(), tokens);
    if config.google.client_id.is_empty() {
        warn!("Google SSO not configured; /auth/google routes will not work");
    }

    // 4. HTTP server
    let app = server::build_router(AppState { auth, goals, sso });
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
