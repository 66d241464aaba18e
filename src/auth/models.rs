//! Domain models for accounts, profiles, and sessions.

use crate::domain::{AuthId, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A stored credential row: one per account.
#[derive(Debug, Clone)]
pub struct AuthCredential {
    pub id: AuthId,
    pub email: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub last_sign_in: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a credential row.
#[derive(Debug, Clone)]
pub struct NewAuthCredential {
    pub id: AuthId,
    pub email: String,
    pub password_hash: String,
}

/// Fields required to create a profile row alongside a credential.
#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub id: ProfileId,
    pub auth_id: AuthId,
    pub first_name: String,
    pub last_name: String,
}

/// Partial update to a credential row. `refresh_token` distinguishes
/// "leave unchanged" (`None`) from "set to NULL" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct AuthCredentialPatch {
    pub refresh_token: Option<Option<String>>,
    pub last_sign_in: Option<DateTime<Utc>>,
}

/// A role attached to a profile, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Whether this role unlocks admin-gated routes.
    pub fn grants_admin(&self) -> bool {
        matches!(self.key.as_str(), "admin" | "super_admin")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Permission {
    pub id: i64,
    pub key: String,
}

/// A stored user profile.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: ProfileId,
    pub auth_id: AuthId,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile as exposed over the API. The linked credential id stays private.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for PublicProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            role: profile.role,
            status: profile.status,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Access/refresh token pair issued by a session refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Full sign-in payload: profile plus a fresh token pair.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub user: PublicProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// Identity attached to an authenticated request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub auth_id: AuthId,
    pub profile: UserProfile,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.profile.role.as_ref().is_some_and(Role::grants_admin)
    }
}

/// Errors produced by the session layer.
///
/// Message text is part of the API contract: bad email and bad password
/// produce the same `InvalidCredentials` message so responses do not reveal
/// which was wrong.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already exists")]
    EmailExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Sign up failed: {0}")]
    SignUpFailed(String),

    #[error("Authentication storage error")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(key: &str) -> Role {
        Role { id: 1, name: key.to_string(), key: key.to_string(), permissions: vec![] }
    }

    #[test]
    fn admin_and_super_admin_grant_admin() {
        assert!(role("admin").grants_admin());
        assert!(role("super_admin").grants_admin());
        assert!(!role("user").grants_admin());
        assert!(!role("Admin").grants_admin());
    }

    #[test]
    fn credential_errors_share_one_message() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn public_profile_drops_auth_link() {
        let profile = UserProfile {
            id: ProfileId::new(),
            auth_id: AuthId::new(),
            first_name: "Ash".to_string(),
            last_name: "Ketchum".to_string(),
            role: None,
            status: "active".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let public = PublicProfile::from(profile.clone());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("authId").is_none());
        assert!(json.get("auth_id").is_none());
        assert_eq!(json["firstName"], "Ash");
    }
}
