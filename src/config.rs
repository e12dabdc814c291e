use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "goaltrackd.db".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing access and refresh tokens. Must be set either
    /// here or via the GOALTRACKD_JWT_SECRET environment variable.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_minutes: default_access_ttl_minutes(),
            refresh_ttl_days: default_refresh_ttl_days(),
        }
    }
}

fn default_access_ttl_minutes() -> i64 {
    30
}
fn default_refresh_ttl_days() -> i64 {
    7
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/auth/google/callback".to_string()
}

impl AppConfig {
    /// Load config.toml (optional) and apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config: AppConfig = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();

        if config.auth.jwt_secret.is_empty() {
            anyhow::bail!(
                "JWT signing secret not configured. Set GOALTRACKD_JWT_SECRET or auth.jwt_secret in config.toml."
            );
        }

        Ok(config)
    }

    /// Environment variables win over config.toml so secrets can stay out of
    /// the file entirely.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GOALTRACKD_DB_PATH") {
            self.state.db_path = v;
        }
        if let Ok(v) = std::env::var("GOALTRACKD_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = std::env::var("GOOGLE_CLIENT_ID") {
            self.google.client_id = v;
        }
        if let Ok(v) = std::env::var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = v;
        }
        if let Ok(v) = std::env::var("GOOGLE_REDIRECT_URI") {
            self.google.redirect_uri = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.state.db_path, "goaltrackd.db");
        assert_eq!(config.auth.access_ttl_minutes, 30);
        assert_eq!(config.auth.refresh_ttl_days, 7);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "test-secret"
            access_ttl_minutes = 5

            [google]
            client_id = "cid"
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.jwt_secret, "test-secret");
        assert_eq!(config.auth.access_ttl_minutes, 5);
        assert_eq!(config.auth.refresh_ttl_days, 7);
        assert_eq!(config.google.client_id, "cid");
        assert_eq!(
            config.google.redirect_uri,
            "http://localhost:8000/auth/google/callback"
        );
    }
}
