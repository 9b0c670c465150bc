//! HS256 session tokens for the `saaslist_session` cookie.

use chrono::{DateTime, Duration, Utc};
use domains::{DomainError, Result, SessionIssuer};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

pub struct JwtSessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtSessionIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl SessionIssuer for JwtSessionIssuer {
    fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            error!(%err, "failed to sign session token");
            DomainError::internal("could not start a session")
        })
    }

    /// Expiry is checked against `now` rather than the wall clock.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| DomainError::unauthorized(format!("invalid session: {e}")))?;
        if data.claims.exp <= now.timestamp() {
            return Err(DomainError::unauthorized("session expired"));
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let issuer = JwtSessionIssuer::new(b"test-secret", Duration::hours(1));
        let user = Uuid::new_v4();
        let now = Utc::now();
        let token = issuer.issue(user, now).unwrap();
        assert_eq!(issuer.verify(&token, now + Duration::minutes(59)).unwrap(), user);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = JwtSessionIssuer::new(b"test-secret", Duration::hours(1));
        let now = Utc::now();
        let token = issuer.issue(Uuid::new_v4(), now).unwrap();
        assert!(issuer.verify(&token, now + Duration::hours(2)).is_err());
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let now = Utc::now();
        let token = JwtSessionIssuer::new(b"one", Duration::hours(1))
            .issue(Uuid::new_v4(), now)
            .unwrap();
        let other = JwtSessionIssuer::new(b"two", Duration::hours(1));
        assert!(other.verify(&token, now).is_err());
    }
}
