/// Invitation model and database operations
///
/// An invitation is a pending, single-use grant of membership: an email
/// address, a target agency, and the role the invitee will receive. The
/// store enforces at most one pending invitation per address through a
/// partial unique index, and consumption is a conditional delete so that
/// exactly one resolver can ever win a race on the same invitation.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE invitation_status AS ENUM ('pending', 'accepted');
///
/// CREATE TABLE invitations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL,
///     agency_id UUID NOT NULL REFERENCES agencies(id) ON DELETE CASCADE,
///     role user_role NOT NULL DEFAULT 'subaccount_user',
///     status invitation_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX idx_invitations_pending_email
///     ON invitations(email) WHERE status = 'pending';
/// ```
///
/// Accepted invitations are deleted rather than retained, so the `accepted`
/// status never appears in a stored row under normal operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::user::Role;

/// Lifecycle status of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Awaiting acceptance by the invited email address
    Pending,

    /// Accepted; only ever observed transiently before deletion
    Accepted,
}

impl InvitationStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
        }
    }
}

/// Invitation model representing a pending membership grant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// Invited email address
    pub email: String,

    /// Target agency
    pub agency_id: Uuid,

    /// Role the invitee will receive
    pub role: Role,

    /// Lifecycle status
    pub status: InvitationStatus,

    /// When the invitation was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    /// Invited email address
    pub email: String,

    /// Target agency
    pub agency_id: Uuid,

    /// Role the invitee will receive
    pub role: Role,
}

/// The fields of a consumed invitation a resolver needs to provision the user
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ConsumedInvitation {
    /// Target agency of the consumed invitation
    pub agency_id: Uuid,

    /// Role granted by the consumed invitation
    pub role: Role,
}

const INVITATION_COLUMNS: &str = "id, email, agency_id, role, status, created_at";

impl Invitation {
    /// Creates a new pending invitation
    ///
    /// # Errors
    ///
    /// Returns a unique-constraint violation if a pending invitation for the
    /// same email already exists.
    pub async fn create(
        db: impl PgExecutor<'_>,
        data: CreateInvitation,
    ) -> Result<Self, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(&format!(
            r#"
            INSERT INTO invitations (email, agency_id, role)
            VALUES ($1, $2, $3)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(data.email)
        .bind(data.agency_id)
        .bind(data.role)
        .fetch_one(db)
        .await?;

        Ok(invitation)
    }

    /// Finds the pending invitation for an email address, if any
    ///
    /// The partial unique index guarantees at most one row can match.
    pub async fn find_pending_by_email(
        db: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE email = $1 AND status = 'pending'"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;

        Ok(invitation)
    }

    /// Consumes the pending invitation for an email address
    ///
    /// This is a conditional delete: it succeeds at most once per
    /// invitation, and its success is the sole signal that the caller won
    /// any race on concurrent consumption. Callers that get `None` must
    /// treat the invitation as already consumed and re-read the resulting
    /// user state instead of failing.
    pub async fn consume_pending(
        db: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<ConsumedInvitation>, sqlx::Error> {
        let consumed = sqlx::query_as::<_, ConsumedInvitation>(
            r#"
            DELETE FROM invitations
            WHERE email = $1 AND status = 'pending'
            RETURNING agency_id, role
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;

        Ok(consumed)
    }

    /// Deletes an invitation by ID (admin revocation)
    ///
    /// Returns true if the invitation was deleted, false if it didn't exist.
    pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists pending invitations for an agency
    pub async fn list_pending_by_agency(
        db: impl PgExecutor<'_>,
        agency_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE agency_id = $1 AND status = 'pending' \
             ORDER BY created_at ASC"
        ))
        .bind(agency_id)
        .fetch_all(db)
        .await?;

        Ok(invitations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_status_as_str() {
        assert_eq!(InvitationStatus::Pending.as_str(), "pending");
        assert_eq!(InvitationStatus::Accepted.as_str(), "accepted");
    }

    #[test]
    fn test_invitation_status_serde_rename() {
        let json = serde_json::to_string(&InvitationStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }

    // Consumption semantics (at-most-once, race behavior) are exercised in
    // tests/onboarding_tests.rs against a real database.
}
