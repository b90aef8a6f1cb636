/// User model and database operations
///
/// This module provides the User model and the tenant role enum. Users are
/// created by the onboarding flow (invitation acceptance) or during agency
/// setup, and are linked to the external identity provider through
/// `identity_id`. Users are never physically deleted by application flows;
/// removal only happens through agency cascade.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM (
///     'agency_owner', 'agency_admin', 'subaccount_user', 'subaccount_guest'
/// );
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     identity_id VARCHAR(255) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     name VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     role user_role NOT NULL DEFAULT 'subaccount_user',
///     agency_id UUID REFERENCES agencies(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The unique constraint on `email` is load-bearing: concurrent provisioning
/// of the same identity degrades to a conflict that callers resolve by
/// re-reading, never to a duplicate row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Tenant roles
///
/// Roles are agency-scoped. `AgencyOwner` is only ever assigned during
/// agency creation; the invitation flow refuses to mint owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control over the agency, billing settings, and deletion
    AgencyOwner,

    /// Can manage users, invitations, and sub-accounts
    AgencyAdmin,

    /// Works inside assigned sub-accounts
    SubaccountUser,

    /// Read-only access to assigned sub-accounts
    SubaccountGuest,
}

impl Role {
    /// Converts role to string for display and provider metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::AgencyOwner => "agency_owner",
            Role::AgencyAdmin => "agency_admin",
            Role::SubaccountUser => "subaccount_user",
            Role::SubaccountGuest => "subaccount_guest",
        }
    }

    /// Parses role from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agency_owner" => Some(Role::AgencyOwner),
            "agency_admin" => Some(Role::AgencyAdmin),
            "subaccount_user" => Some(Role::SubaccountUser),
            "subaccount_guest" => Some(Role::SubaccountGuest),
            _ => None,
        }
    }

    /// Can manage users and invitations within the agency
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::AgencyOwner | Role::AgencyAdmin)
    }

    /// Can manage billing-adjacent settings
    pub fn can_manage_billing(&self) -> bool {
        matches!(self, Role::AgencyOwner)
    }

    /// Can delete the agency
    pub fn can_delete_agency(&self) -> bool {
        matches!(self, Role::AgencyOwner)
    }

    /// Checks if this role meets the required role level
    ///
    /// Hierarchy: AgencyOwner > AgencyAdmin > SubaccountUser > SubaccountGuest
    pub fn has_permission(&self, required: &Role) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            Role::AgencyOwner => 4,
            Role::AgencyAdmin => 3,
            Role::SubaccountUser => 2,
            Role::SubaccountGuest => 1,
        }
    }
}

/// User model representing an identity-provider-linked account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Stable unique identifier at the identity provider
    pub identity_id: String,

    /// Email address, unique across all users
    pub email: String,

    /// Display name
    pub name: String,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// Tenant role
    pub role: Role,

    /// Owning agency (None until the user is bound to a tenant)
    pub agency_id: Option<Uuid>,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Identity-provider user id
    pub identity_id: String,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    /// Tenant role
    pub role: Role,

    /// Owning agency
    pub agency_id: Option<Uuid>,
}

const USER_COLUMNS: &str =
    "id, identity_id, email, name, avatar_url, role, agency_id, created_at, updated_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email or identity id already exists (unique
    /// constraint violation) or the database connection fails.
    pub async fn create(db: impl PgExecutor<'_>, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identity_id, email, name, avatar_url, role, agency_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, identity_id, email, name, avatar_url, role, agency_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.identity_id)
        .bind(data.email)
        .bind(data.name)
        .bind(data.avatar_url)
        .bind(data.role)
        .bind(data.agency_id)
        .fetch_one(db)
        .await?;

        Ok(user)
    }

    /// Creates a user unless one with the same email already exists
    ///
    /// Returns `None` when the insert was skipped because of the email
    /// uniqueness constraint. This is the insert half of idempotent
    /// provisioning: callers that get `None` re-read the existing row
    /// instead of treating the conflict as a failure.
    pub async fn create_if_absent(
        db: impl PgExecutor<'_>,
        data: CreateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identity_id, email, name, avatar_url, role, agency_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, identity_id, email, name, avatar_url, role, agency_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.identity_id)
        .bind(data.email)
        .bind(data.name)
        .bind(data.avatar_url)
        .bind(data.role)
        .bind(data.agency_id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(
        db: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(
        db: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Finds a user by its identity-provider id
    pub async fn find_by_identity(
        db: impl PgExecutor<'_>,
        identity_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE identity_id = $1"
        ))
        .bind(identity_id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Finds any user belonging to the agency that owns the given sub-account
    ///
    /// Used by the activity writer to attribute system-initiated actions
    /// when no authenticated identity is available.
    pub async fn find_any_in_owning_agency(
        db: impl PgExecutor<'_>,
        sub_account_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.identity_id, u.email, u.name, u.avatar_url, u.role,
                   u.agency_id, u.created_at, u.updated_at
            FROM users u
            JOIN sub_accounts s ON s.agency_id = u.agency_id
            WHERE s.id = $1
            LIMIT 1
            "#,
        )
        .bind(sub_account_id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Rebinds an existing user to an agency with a new role
    ///
    /// Used when an already-known identity creates an agency: the user row
    /// survives, only its tenant binding changes.
    ///
    /// Returns the updated user if found, None if no user has that email.
    pub async fn bind_to_agency(
        db: impl PgExecutor<'_>,
        email: &str,
        agency_id: Uuid,
        role: Role,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET agency_id = $2, role = $3, updated_at = NOW()
            WHERE email = $1
            RETURNING id, identity_id, email, name, avatar_url, role, agency_id,
                      created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(agency_id)
        .bind(role)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Updates a user's role
    ///
    /// Returns the updated user if found, None if the user doesn't exist.
    pub async fn update_role(
        db: impl PgExecutor<'_>,
        id: Uuid,
        role: Role,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, identity_id, email, name, avatar_url, role, agency_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Lists all users bound to an agency
    pub async fn list_by_agency(
        db: impl PgExecutor<'_>,
        agency_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE agency_id = $1 ORDER BY created_at ASC"
        ))
        .bind(agency_id)
        .fetch_all(db)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::AgencyOwner.as_str(), "agency_owner");
        assert_eq!(Role::AgencyAdmin.as_str(), "agency_admin");
        assert_eq!(Role::SubaccountUser.as_str(), "subaccount_user");
        assert_eq!(Role::SubaccountGuest.as_str(), "subaccount_guest");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("agency_owner"), Some(Role::AgencyOwner));
        assert_eq!(Role::parse("agency_admin"), Some(Role::AgencyAdmin));
        assert_eq!(Role::parse("subaccount_user"), Some(Role::SubaccountUser));
        assert_eq!(Role::parse("subaccount_guest"), Some(Role::SubaccountGuest));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [
            Role::AgencyOwner,
            Role::AgencyAdmin,
            Role::SubaccountUser,
            Role::SubaccountGuest,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::AgencyOwner.can_manage_users());
        assert!(Role::AgencyOwner.can_manage_billing());
        assert!(Role::AgencyOwner.can_delete_agency());

        assert!(Role::AgencyAdmin.can_manage_users());
        assert!(!Role::AgencyAdmin.can_manage_billing());
        assert!(!Role::AgencyAdmin.can_delete_agency());

        assert!(!Role::SubaccountUser.can_manage_users());
        assert!(!Role::SubaccountGuest.can_manage_users());
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::AgencyOwner.has_permission(&Role::AgencyAdmin));
        assert!(Role::AgencyAdmin.has_permission(&Role::AgencyAdmin));
        assert!(!Role::SubaccountUser.has_permission(&Role::AgencyAdmin));
        assert!(Role::SubaccountUser.has_permission(&Role::SubaccountGuest));
        assert!(!Role::SubaccountGuest.has_permission(&Role::SubaccountUser));
    }

    // Integration tests for database operations are in tests/onboarding_tests.rs
}
