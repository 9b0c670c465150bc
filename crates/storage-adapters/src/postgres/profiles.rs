use async_trait::async_trait;
use domains::{Credentials, Profile, ProfileRepository, Result};
use uuid::Uuid;

use super::{map_err, PgStore};

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    name: Option<String>,
    avatar_url: Option<String>,
    email: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            name: row.name,
            avatar_url: row.avatar_url,
            email: row.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    profile: ProfileRow,
    password_hash: String,
}

#[async_trait]
impl ProfileRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT id, name, avatar_url, email FROM profiles WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_err)?;
        Ok(row.map(Profile::from))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        let row: Option<CredentialsRow> = sqlx::query_as(
            "SELECT id, name, avatar_url, email, password_hash FROM profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(row.map(|row| Credentials {
            profile: row.profile.into(),
            password_hash: row.password_hash,
        }))
    }

    async fn insert(&self, profile: Profile, password_hash: String) -> Result<()> {
        sqlx::query(
            "INSERT INTO profiles (id, name, avatar_url, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(&profile.avatar_url)
        .bind(&profile.email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(())
    }
}
