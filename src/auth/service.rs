use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::core_types::AccountId;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // Subject (account_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    /// Account the bearer acts as
    pub fn account_id(&self) -> Result<AccountId> {
        self.sub
            .parse()
            .with_context(|| format!("Invalid subject in token: {}", self.sub))
    }
}

/// HS256 bearer tokens identifying an account.
///
/// Tokens are issued by the identity layer in front of the ledger; this
/// service only needs the shared secret.
pub struct JwtAuth {
    secret: String,
}

impl JwtAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn issue_token(&self, account_id: AccountId, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .context("Token expiry out of range")?
            .timestamp();

        let claims = Claims {
            sub: account_id.to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate token")
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let auth = JwtAuth::new("test-secret");
        let token = auth.issue_token(42, Duration::hours(1)).unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.account_id().unwrap(), 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtAuth::new("a").issue_token(1, Duration::hours(1)).unwrap();
        assert!(JwtAuth::new("b").verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = JwtAuth::new("test-secret");
        // Past the default 60s leeway
        let token = auth.issue_token(1, Duration::minutes(-5)).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "alice".into(),
            exp: 0,
            iat: 0,
        };
        assert!(claims.account_id().is_err());
    }
}
