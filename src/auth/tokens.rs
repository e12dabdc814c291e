use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::errors::ApiError;

/// Value of the `token_type` field in every issued bundle.
pub const TOKEN_TYPE: &str = "bearer";

/// Which of the two token kinds a JWT claims to be. Carried in the
/// `token_use` claim and checked on verification so a refresh token can
/// never authenticate an API call (or vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenUse {
    Access,
    Refresh,
}

impl TokenUse {
    fn as_str(self) -> &'static str {
        match self {
            TokenUse::Access => "access",
            TokenUse::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: i64,
    token_use: String,
    exp: i64,
}

/// Stateless HS256 token issuer/verifier. Nothing is persisted; expiry is
/// the only invalidation mechanism, so a leaked token stays valid until it
/// runs out.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    pub fn issue(&self, user_id: i64, token_use: TokenUse) -> anyhow::Result<String> {
        let ttl = match token_use {
            TokenUse::Access => self.access_ttl,
            TokenUse::Refresh => self.refresh_ttl,
        };
        self.issue_with_ttl(user_id, token_use, ttl)
    }

    fn issue_with_ttl(
        &self,
        user_id: i64,
        token_use: TokenUse,
        ttl: Duration,
    ) -> anyhow::Result<String> {
        let claims = Claims {
            user_id,
            token_use: token_use.as_str().to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Decode and check signature, expiry, and token kind. Every failure
    /// mode collapses into `Unauthorized`.
    pub fn verify(&self, token: &str, expected_use: TokenUse) -> Result<i64, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the default 60s leeway would keep a just-expired
        // token alive.
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        if data.claims.token_use != expected_use.as_str() {
            return Err(ApiError::unauthorized("Invalid or expired token"));
        }

        Ok(data.claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiErrorKind;

    fn test_service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
        })
    }

    #[test]
    fn issued_token_verifies_before_expiry() {
        let service = test_service();
        let token = service.issue(42, TokenUse::Access).unwrap();
        assert_eq!(service.verify(&token, TokenUse::Access).unwrap(), 42);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = test_service();
        let token = service
            .issue_with_ttl(42, TokenUse::Access, Duration::seconds(-5))
            .unwrap();
        let err = service.verify(&token, TokenUse::Access).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let service = test_service();

        let access = service.issue(42, TokenUse::Access).unwrap();
        let err = service.verify(&access, TokenUse::Refresh).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);

        let refresh = service.issue(42, TokenUse::Refresh).unwrap();
        let err = service.verify(&refresh, TokenUse::Access).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    }

    #[test]
    fn tampered_or_malformed_tokens_are_rejected() {
        let service = test_service();
        let token = service.issue(42, TokenUse::Access).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(service.verify(&tampered, TokenUse::Access).is_err());
        assert!(service.verify("not-a-jwt", TokenUse::Access).is_err());
        assert!(service.verify("", TokenUse::Access).is_err());
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let service = test_service();
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "different-secret".to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
        });
        let token = service.issue(42, TokenUse::Access).unwrap();
        assert!(other.verify(&token, TokenUse::Access).is_err());
    }
}
