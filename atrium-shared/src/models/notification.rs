/// Notification model and database operations
///
/// Notifications are append-only activity-log entries: a human-readable
/// message plus references to the acting user, the owning agency, and
/// optionally the sub-account the action happened in. Rows are never
/// updated or deleted by application flows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     notification TEXT NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     agency_id UUID NOT NULL REFERENCES agencies(id) ON DELETE CASCADE,
///     sub_account_id UUID REFERENCES sub_accounts(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Notification model representing one activity-log entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Stored message, composed as "{display name} {description}"
    pub notification: String,

    /// Acting user
    pub user_id: Uuid,

    /// Owning agency
    pub agency_id: Uuid,

    /// Sub-account the action happened in, when applicable
    pub sub_account_id: Option<Uuid>,

    /// When the entry was recorded
    pub created_at: DateTime<Utc>,

    /// Mirrors created_at; entries are immutable
    pub updated_at: DateTime<Utc>,
}

/// Input for appending a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Stored message
    pub notification: String,

    /// Acting user
    pub user_id: Uuid,

    /// Owning agency
    pub agency_id: Uuid,

    /// Sub-account the action happened in, when applicable
    pub sub_account_id: Option<Uuid>,
}

/// A notification joined with its acting user, for feed rendering
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationWithUser {
    pub id: Uuid,
    pub notification: String,
    pub user_id: Uuid,
    pub agency_id: Uuid,
    pub sub_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,

    /// Acting user's display name
    pub user_name: String,

    /// Acting user's avatar URL
    pub user_avatar_url: Option<String>,
}

impl Notification {
    /// Appends one notification row
    pub async fn create(
        db: impl PgExecutor<'_>,
        data: CreateNotification,
    ) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (notification, user_id, agency_id, sub_account_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, notification, user_id, agency_id, sub_account_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.notification)
        .bind(data.user_id)
        .bind(data.agency_id)
        .bind(data.sub_account_id)
        .fetch_one(db)
        .await?;

        Ok(notification)
    }

    /// Lists an agency's notifications, newest first, with acting users joined
    pub async fn list_for_agency(
        db: impl PgExecutor<'_>,
        agency_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationWithUser>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, NotificationWithUser>(
            r#"
            SELECT n.id, n.notification, n.user_id, n.agency_id, n.sub_account_id,
                   n.created_at,
                   u.name AS user_name, u.avatar_url AS user_avatar_url
            FROM notifications n
            JOIN users u ON u.id = n.user_id
            WHERE n.agency_id = $1
            ORDER BY n.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(agency_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(notifications)
    }

    /// Counts notifications recorded against an agency
    pub async fn count_for_agency(
        db: impl PgExecutor<'_>,
        agency_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE agency_id = $1")
                .bind(agency_id)
                .fetch_one(db)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_notification_payload() {
        let data = CreateNotification {
            notification: "Jane Doe Updated the agency goal to | 7 Sub Account".to_string(),
            user_id: Uuid::new_v4(),
            agency_id: Uuid::new_v4(),
            sub_account_id: None,
        };

        assert!(data.notification.starts_with("Jane Doe"));
        assert!(data.sub_account_id.is_none());
    }
}
