//! Credential and profile repository backing the session service.
//!
//! Account creation writes the credential and profile rows in a single
//! transaction. Refresh token rotation is a conditional update keyed on the
//! token being replaced, so concurrent rotations of the same token cannot
//! both succeed.

use crate::auth::models::{
    AuthCredential, AuthCredentialPatch, NewAuthCredential, NewUserProfile, Role, UserProfile,
};
use crate::domain::{AuthId, ProfileId};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

// Database row structures

#[derive(Debug, Clone, FromRow)]
struct AuthRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub last_sign_in: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct ProfileRow {
    pub id: String,
    pub auth_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>, // JSON stored as string
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Repository trait

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Look up a credential by email
    async fn find_auth_by_email(&self, email: &str) -> Result<Option<AuthCredential>>;

    /// Look up a credential by its stored refresh token (exact match)
    async fn find_auth_by_refresh_token(&self, token: &str) -> Result<Option<AuthCredential>>;

    /// Create a credential and its profile atomically
    async fn create_account(
        &self,
        credential: NewAuthCredential,
        profile: NewUserProfile,
    ) -> Result<UserProfile>;

    /// Apply a partial update to a credential row
    async fn update_auth(&self, id: &AuthId, patch: AuthCredentialPatch) -> Result<()>;

    /// Replace `current` with `next` only if `current` is still stored.
    /// Returns whether a row was updated.
    async fn rotate_refresh_token(&self, current: &str, next: &str) -> Result<bool>;

    /// Fetch the profile linked to a credential
    async fn find_profile_by_auth_id(&self, auth_id: &AuthId) -> Result<Option<UserProfile>>;
}

// SQLite implementation

#[derive(Debug, Clone)]
pub struct SqlxCredentialRepository {
    pool: DbPool,
}

impl SqlxCredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_credential(&self, row: AuthRow) -> AuthCredential {
        AuthCredential {
            id: AuthId::from_string(row.id),
            email: row.email,
            password_hash: row.password_hash,
            refresh_token: row.refresh_token,
            last_sign_in: row.last_sign_in,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn row_to_profile(&self, row: ProfileRow) -> Result<UserProfile> {
        let role = row
            .role
            .as_deref()
            .map(serde_json::from_str::<Role>)
            .transpose()
            .map_err(|e| Error::validation(format!("Invalid role JSON on profile: {}", e)))?;

        Ok(UserProfile {
            id: ProfileId::from_string(row.id),
            auth_id: AuthId::from_string(row.auth_id),
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl CredentialRepository for SqlxCredentialRepository {
    #[instrument(skip(self), fields(email = %email), name = "db_find_auth_by_email")]
    async fn find_auth_by_email(&self, email: &str) -> Result<Option<AuthCredential>> {
        let row = sqlx::query_as::<_, AuthRow>(
            "SELECT id, email, password_hash, refresh_token, last_sign_in, created_at, updated_at FROM auth WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch credential by email".to_string(),
        })?;

        Ok(row.map(|r| self.row_to_credential(r)))
    }

    #[instrument(skip_all, name = "db_find_auth_by_refresh_token")]
    async fn find_auth_by_refresh_token(&self, token: &str) -> Result<Option<AuthCredential>> {
        let row = sqlx::query_as::<_, AuthRow>(
            "SELECT id, email, password_hash, refresh_token, last_sign_in, created_at, updated_at FROM auth WHERE refresh_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch credential by refresh token".to_string(),
        })?;

        Ok(row.map(|r| self.row_to_credential(r)))
    }

    #[instrument(skip(self, credential, profile), fields(email = %credential.email, auth_id = %credential.id), name = "db_create_account")]
    async fn create_account(
        &self,
        credential: NewAuthCredential,
        profile: NewUserProfile,
    ) -> Result<UserProfile> {
        let mut tx = self.pool.begin().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to begin account creation transaction".to_string(),
        })?;

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO auth (id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(credential.id.as_str())
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to create credential".to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, auth_id, first_name, last_name, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'active', $5, $6)
            "#,
        )
        .bind(profile.id.as_str())
        .bind(profile.auth_id.as_str())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to create profile".to_string(),
        })?;

        tx.commit().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to commit account creation".to_string(),
        })?;

        self.find_profile_by_auth_id(&profile.auth_id)
            .await?
            .ok_or_else(|| Error::internal("Profile not found after creation"))
    }

    #[instrument(skip(self, patch), fields(auth_id = %id), name = "db_update_auth")]
    async fn update_auth(&self, id: &AuthId, patch: AuthCredentialPatch) -> Result<()> {
        let current = sqlx::query_as::<_, AuthRow>(
            "SELECT id, email, password_hash, refresh_token, last_sign_in, created_at, updated_at FROM auth WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch credential for update".to_string(),
        })?
        .ok_or_else(|| Error::not_found("Credential", id.to_string()))?;

        let refresh_token = match patch.refresh_token {
            Some(value) => value,
            None => current.refresh_token,
        };
        let last_sign_in = patch.last_sign_in.or(current.last_sign_in);

        sqlx::query(
            "UPDATE auth SET refresh_token = $1, last_sign_in = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(&refresh_token)
        .bind(last_sign_in)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to update credential".to_string(),
        })?;

        Ok(())
    }

    #[instrument(skip_all, name = "db_rotate_refresh_token")]
    async fn rotate_refresh_token(&self, current: &str, next: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE auth SET refresh_token = $1, updated_at = $2 WHERE refresh_token = $3",
        )
        .bind(next)
        .bind(Utc::now())
        .bind(current)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to rotate refresh token".to_string(),
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(auth_id = %auth_id), name = "db_find_profile_by_auth_id")]
    async fn find_profile_by_auth_id(&self, auth_id: &AuthId) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, auth_id, first_name, last_name, role, status, created_at, updated_at FROM profiles WHERE auth_id = $1",
        )
        .bind(auth_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch profile".to_string(),
        })?;

        row.map(|r| self.row_to_profile(r)).transpose()
    }
}
