//! HS256 bearer tokens asserting who the caller is.

use std::time::Duration;

use jsonwebtoken::{
    errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Identity asserted by a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
}

/// A freshly signed token and its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until expiry
    pub expires_in: u64,
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Issue a token for the given user, valid for the configured ttl.
    pub fn issue(
        &self,
        user_id: u64,
        username: &str,
        email: &str,
    ) -> Result<IssuedToken, TokenError> {
        let iat = get_current_timestamp();
        let expires_in = self.ttl.as_secs();
        let claims = Claims {
            user_id,
            username: username.to_owned(),
            email: email.to_owned(),
            iat,
            exp: iat.saturating_add(expires_in),
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_in,
        })
    }

    /// Check signature and expiry, returning the asserted identity.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(err),
            })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Sign)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn issued_token_round_trips_identity() {
        let issuer = TokenIssuer::new("test-secret", DAY);
        let issued = issuer.issue(7, "alice", "alice@x.com").unwrap();

        assert_eq!(issued.expires_in, 86_400);

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_overflowing() {
        let issuer = TokenIssuer::new("test-secret", Duration::from_secs(u64::MAX));
        let issued = issuer.issue(7, "alice", "alice@x.com").unwrap();

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.exp, u64::MAX);
    }

    #[test]
    fn claims_use_camel_case_on_the_wire() {
        let claims = Claims {
            user_id: 1,
            username: "john_doe".into(),
            email: "john@example.com".into(),
            iat: 0,
            exp: 1,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 1);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issuer = TokenIssuer::new("test-secret", DAY);
        let forger = TokenIssuer::new("other-secret", DAY);
        let forged = forger.issue(1, "john_doe", "john@example.com").unwrap();

        assert!(matches!(
            issuer.verify(&forged.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", DAY);
        let now = get_current_timestamp();
        let stale = Claims {
            user_id: 1,
            username: "john_doe".into(),
            email: "john@example.com".into(),
            iat: now - 2 * 86_400,
            exp: now - 86_400,
        };
        let token = issuer.sign(&stale).unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_is_invalid() {
        let issuer = TokenIssuer::new("test-secret", DAY);
        assert!(matches!(
            issuer.verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
    }
}
