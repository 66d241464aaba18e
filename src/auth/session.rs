//! # Session Service
//!
//! Orchestrates the account lifecycle: sign-up, sign-in, refresh rotation,
//! sign-out, and resolving the identity behind a presented access token.

use crate::auth::hashing;
use crate::auth::models::{
    AuthCredentialPatch, AuthError, CurrentUser, NewAuthCredential, NewUserProfile,
    PublicProfile, SessionTokens, SignInResponse,
};
use crate::auth::token::{TokenCodec, ValidityClass};
use crate::domain::{AuthId, ProfileId};
use crate::errors::Error;
use crate::storage::repositories::{CredentialRepository, SqlxCredentialRepository};
use crate::storage::DbPool;
use chrono::Utc;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Sign-up input after HTTP-level validation.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Account session operations backed by a credential repository.
#[derive(Clone)]
pub struct SessionService {
    repository: Arc<dyn CredentialRepository>,
    codec: TokenCodec,
}

impl SessionService {
    pub fn new(repository: Arc<dyn CredentialRepository>, codec: TokenCodec) -> Self {
        Self { repository, codec }
    }

    /// Convenience constructor over a SQLite pool.
    pub fn with_sqlx(pool: DbPool, codec: TokenCodec) -> Self {
        Self::new(Arc::new(SqlxCredentialRepository::new(pool)), codec)
    }

    /// Create an account and its profile and return the public profile.
    ///
    /// The credential and profile rows are written in one transaction, so a
    /// failed sign-up never leaves an orphaned credential behind. No session
    /// is established; the caller signs in separately.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<PublicProfile, AuthError> {
        let existing = self
            .repository
            .find_auth_by_email(&request.email)
            .await
            .map_err(store_err)?;
        if existing.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hashing::hash_password(&request.password)
            .map_err(|e| AuthError::SignUpFailed(e.to_string()))?;

        let auth_id = AuthId::new();
        let credential = NewAuthCredential {
            id: auth_id.clone(),
            email: request.email,
            password_hash,
        };
        let profile = NewUserProfile {
            id: ProfileId::new(),
            auth_id: auth_id.clone(),
            first_name: request.first_name,
            last_name: request.last_name,
        };

        // Two concurrent sign-ups can both pass the email pre-check; the
        // loser hits the UNIQUE constraint on insert and still gets the
        // same answer as an up-front duplicate.
        let profile = self
            .repository
            .create_account(credential, profile)
            .await
            .map_err(|e| match &e {
                Error::Database { source, .. }
                    if source
                        .as_database_error()
                        .is_some_and(|db_err| db_err.is_unique_violation()) =>
                {
                    AuthError::EmailExists
                }
                _ => AuthError::SignUpFailed(e.to_string()),
            })?;

        Ok(profile.into())
    }

    /// Verify credentials and establish a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, AuthError> {
        let credential = self
            .repository
            .find_auth_by_email(email)
            .await
            .map_err(store_err)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !hashing::verify_password(password, &credential.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let (access_token, refresh_token) =
            self.issue_pair(&credential.id, ValidityClass::Minutes15);
        self.persist_session(&credential.id, &refresh_token).await?;

        let profile = self
            .repository
            .find_profile_by_auth_id(&credential.id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| AuthError::Unauthorized("Profile not found".to_string()))?;

        Ok(SignInResponse { user: profile.into(), access_token, refresh_token })
    }

    /// Exchange a stored refresh token for a new token pair.
    ///
    /// Rotation is conditional on the presented token still being the stored
    /// one, so two concurrent refreshes with the same token cannot both win.
    /// Refreshed access tokens carry the longer 2h validity.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<SessionTokens, AuthError> {
        let credential = self
            .repository
            .find_auth_by_refresh_token(refresh_token)
            .await
            .map_err(store_err)?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let (access_token, new_refresh) = self.issue_pair(&credential.id, ValidityClass::Hours2);

        let rotated = self
            .repository
            .rotate_refresh_token(refresh_token, &new_refresh)
            .await
            .map_err(store_err)?;
        if !rotated {
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(SessionTokens { access_token, refresh_token: new_refresh })
    }

    /// Invalidate the stored refresh token. Idempotent: signing out an
    /// account with no active session succeeds.
    #[instrument(skip(self), fields(auth_id = %auth_id))]
    pub async fn sign_out(&self, auth_id: &AuthId) -> Result<(), AuthError> {
        let patch = AuthCredentialPatch { refresh_token: Some(None), ..Default::default() };
        self.repository.update_auth(auth_id, patch).await.map_err(store_err)?;
        Ok(())
    }

    /// Resolve the identity behind an access token.
    ///
    /// Verification is structural: field shape, issuer secret, and expiry.
    /// No stored state is consulted beyond the profile lookup, so sign-out
    /// does not revoke access tokens already in flight.
    #[instrument(skip_all)]
    pub async fn resolve_identity(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let decoded = self
            .codec
            .decode(token)
            .ok_or_else(|| AuthError::Unauthorized("Invalid token".to_string()))?;

        if decoded.is_expired() {
            return Err(AuthError::Unauthorized("Token expired".to_string()));
        }

        let profile = self
            .repository
            .find_profile_by_auth_id(&decoded.subject)
            .await
            .map_err(store_err)?
            .ok_or_else(|| AuthError::Unauthorized("Unknown account".to_string()))?;

        Ok(CurrentUser { auth_id: decoded.subject, profile })
    }

    fn issue_pair(&self, auth_id: &AuthId, access_validity: ValidityClass) -> (String, String) {
        let access = self.codec.issue(auth_id, access_validity);
        let refresh = self.codec.issue(auth_id, ValidityClass::Days7);
        (access, refresh)
    }

    async fn persist_session(
        &self,
        auth_id: &AuthId,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let patch = AuthCredentialPatch {
            refresh_token: Some(Some(refresh_token.to_string())),
            last_sign_in: Some(Utc::now()),
        };
        self.repository.update_auth(auth_id, patch).await.map_err(store_err)?;
        Ok(())
    }
}

/// Log the storage failure in full and hand callers an opaque error.
fn store_err(err: Error) -> AuthError {
    warn!(error = %err, "credential store operation failed");
    AuthError::Store(err.to_string())
}
