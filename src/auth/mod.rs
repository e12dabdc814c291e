pub mod password;
pub mod tokens;

pub use tokens::{TokenService, TokenUse, TOKEN_TYPE};

use std::sync::Arc;

use tracing::info;

use crate::errors::ApiError;
use crate::traits::store_prelude::*;
use crate::traits::{NewUser, User};

/// Password registration is restricted to company addresses.
const ALLOWED_EMAIL_DOMAIN: &str = "mouritech.com";

/// Access + refresh pair for a freshly authenticated user.
#[derive(Debug, Clone)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
}

/// Registration, password login, token refresh, and the one-time
/// set-password flow for SSO-only accounts.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn StateStore + Send + Sync>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn StateStore + Send + Sync>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password, 72)?;

        if let Some(existing) = self.store.get_user_by_email(email).await? {
            // The caller-visible message distinguishes how the account came
            // to exist; both are the same Conflict kind.
            if existing.password_hash.is_some() {
                return Err(ApiError::conflict("Email already registered"));
            }
            return Err(ApiError::conflict(
                "Account already exists via SSO. Please login using Google.",
            ));
        }

        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(ApiError::conflict("Username already registered"));
        }

        let password_hash = password::hash_password(password)?;
        let user = self
            .store
            .create_user(&NewUser {
                username: Some(username.to_string()),
                email: email.to_string(),
                password_hash: Some(password_hash),
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenBundle, ApiError> {
        // One failure path for "no such user", "SSO-only account", and
        // "wrong password" — the caller learns nothing about which.
        match self.store.get_user_by_email(email).await? {
            Some(user) => {
                let verified = user
                    .password_hash
                    .as_deref()
                    .map(|hash| password::verify_password(password, hash))
                    .unwrap_or(false);
                if !verified {
                    return Err(ApiError::unauthorized("Invalid credentials"));
                }
                self.issue_bundle(user.id)
            }
            None => Err(ApiError::unauthorized("Invalid credentials")),
        }
    }

    /// Mint a new access token from a valid refresh token. The refresh token
    /// is neither rotated nor invalidated.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, ApiError> {
        let user_id = self.tokens.verify(refresh_token, TokenUse::Refresh)?;
        Ok(self.tokens.issue(user_id, TokenUse::Access)?)
    }

    /// One-time path for an SSO-only account to gain a password. Accounts
    /// that already have one are rejected; no operation replaces an existing
    /// hash.
    pub async fn set_password(&self, user: &User, password: &str) -> Result<(), ApiError> {
        validate_password(password, 128)?;

        if user.password_hash.is_some() {
            return Err(ApiError::conflict("Password already set for this account"));
        }

        let password_hash = password::hash_password(password)?;
        self.store.set_password_hash(user.id, &password_hash).await?;
        info!(user_id = user.id, "Password set for SSO account");
        Ok(())
    }

    /// Resolve the caller from a bearer access token.
    pub async fn resolve_current_user(&self, access_token: &str) -> Result<User, ApiError> {
        let user_id = self.tokens.verify(access_token, TokenUse::Access)?;
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))
    }

    pub fn issue_bundle(&self, user_id: i64) -> Result<TokenBundle, ApiError> {
        Ok(TokenBundle {
            access_token: self.tokens.issue(user_id, TokenUse::Access)?,
            refresh_token: self.tokens.issue(user_id, TokenUse::Refresh)?,
            user_id,
        })
    }
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if !(3..=100).contains(&len) {
        return Err(ApiError::validation(
            "Username must be between 3 and 100 characters",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::validation("Invalid email address"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ApiError::validation("Invalid email address"));
    }
    if !domain.eq_ignore_ascii_case(ALLOWED_EMAIL_DOMAIN) {
        return Err(ApiError::validation("Email domain must be of mouritech"));
    }
    Ok(())
}

fn validate_password(password: &str, max: usize) -> Result<(), ApiError> {
    let len = password.chars().count();
    if !(8..=max).contains(&len) {
        return Err(ApiError::validation(format!(
            "Password must be between 8 and {} characters",
            max
        )));
    }
    Ok(())
}
