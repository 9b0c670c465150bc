//! Sign-in, session resolution and account creation.
//!
//! Tokens are stateless: signing out is the HTTP layer dropping the cookie.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{DomainError, PasswordHasher, Profile, ProfileRepository, Result, SessionIssuer};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_TAKEN: &str = "An account with this email already exists";
const PASSWORD_MIN: usize = 8;

pub struct SessionService {
    profiles: Arc<dyn ProfileRepository>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn SessionIssuer>,
}

impl SessionService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn SessionIssuer>,
    ) -> Self {
        Self {
            profiles,
            hasher,
            issuer,
        }
    }

    /// Returns the profile and a fresh session token.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(Profile, String)> {
        let email = normalize_email(email);
        let Some(credentials) = self.profiles.find_credentials(&email).await? else {
            debug!("unknown email");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };
        if !self.hasher.verify(password, &credentials.password_hash) {
            debug!("password mismatch");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }
        let token = self.issuer.issue(credentials.profile.id, now)?;
        info!(user_id = %credentials.profile.id, "signed in");
        Ok((credentials.profile, token))
    }

    /// Resolves a cookie token to its profile; bad or expired tokens are anonymous.
    pub async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Profile>> {
        let user_id = match self.issuer.verify(token, now) {
            Ok(id) => id,
            Err(err) => {
                debug!(%err, "rejected session token");
                return Ok(None);
            }
        };
        self.profiles.find_by_id(user_id).await
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        avatar_url: Option<String>,
    ) -> Result<Profile> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(DomainError::validation("Enter a valid email address"));
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(DomainError::validation(format!(
                "Password must be at least {PASSWORD_MIN} characters"
            )));
        }
        let name = name.trim();
        let profile = Profile {
            id: Uuid::new_v4(),
            name: (!name.is_empty()).then(|| name.to_string()),
            avatar_url,
            email: Some(email),
        };
        let hash = self.hasher.hash(password)?;
        self.profiles
            .insert(profile.clone(), hash)
            .await
            .map_err(|err| match err {
                DomainError::Conflict(_) => DomainError::Conflict(EMAIL_TAKEN.to_string()),
                other => other,
            })?;
        info!(user_id = %profile.id, "profile registered");
        Ok(profile)
    }

    /// Registers a profile and signs it straight in.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(Profile, String)> {
        let profile = self.register(name, email, password, None).await?;
        let token = self.issuer.issue(profile.id, now)?;
        Ok((profile, token))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
