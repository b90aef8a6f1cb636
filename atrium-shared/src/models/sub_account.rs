/// Sub-account model and database operations
///
/// Sub-accounts are child tenant units owned by exactly one agency. They
/// share the agency's contact/address shape and carry their own branding
/// and billing reference.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sub_accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     agency_id UUID NOT NULL REFERENCES agencies(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     company_email VARCHAR(255) NOT NULL,
///     company_phone VARCHAR(64),
///     address VARCHAR(255),
///     city VARCHAR(128),
///     zip_code VARCHAR(32),
///     state VARCHAR(128),
///     country VARCHAR(128),
///     sub_account_logo VARCHAR(512),
///     goal INTEGER NOT NULL DEFAULT 5,
///     connect_account_id VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Sub-account model representing a child tenant unit
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubAccount {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub name: String,
    pub company_email: String,
    pub company_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub sub_account_logo: Option<String>,
    pub goal: i32,
    pub connect_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or updating a sub-account
///
/// When `id` is provided and a row with that id already exists, the row is
/// updated in place (the settings form submits the full record either way).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSubAccount {
    /// Existing id, or None to create a fresh sub-account
    pub id: Option<Uuid>,
    pub agency_id: Uuid,
    pub name: String,
    pub company_email: String,
    pub company_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub sub_account_logo: Option<String>,
    pub connect_account_id: Option<String>,
}

const SUB_ACCOUNT_COLUMNS: &str = "id, agency_id, name, company_email, company_phone, address, \
     city, zip_code, state, country, sub_account_logo, goal, connect_account_id, \
     created_at, updated_at";

impl SubAccount {
    /// Creates or updates a sub-account
    ///
    /// The owning agency of an existing sub-account is never changed by an
    /// upsert; ownership is exclusive and fixed at creation. An upsert that
    /// targets a sub-account owned by a different agency matches no row and
    /// returns `RowNotFound`.
    pub async fn upsert(
        db: impl PgExecutor<'_>,
        data: UpsertSubAccount,
    ) -> Result<Self, sqlx::Error> {
        let sub_account = sqlx::query_as::<_, SubAccount>(&format!(
            r#"
            INSERT INTO sub_accounts (id, agency_id, name, company_email, company_phone,
                                      address, city, zip_code, state, country,
                                      sub_account_logo, connect_account_id)
            VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                company_email = EXCLUDED.company_email,
                company_phone = EXCLUDED.company_phone,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                zip_code = EXCLUDED.zip_code,
                state = EXCLUDED.state,
                country = EXCLUDED.country,
                sub_account_logo = EXCLUDED.sub_account_logo,
                connect_account_id = EXCLUDED.connect_account_id,
                updated_at = NOW()
            WHERE sub_accounts.agency_id = EXCLUDED.agency_id
            RETURNING {SUB_ACCOUNT_COLUMNS}
            "#
        ))
        .bind(data.id)
        .bind(data.agency_id)
        .bind(data.name)
        .bind(data.company_email)
        .bind(data.company_phone)
        .bind(data.address)
        .bind(data.city)
        .bind(data.zip_code)
        .bind(data.state)
        .bind(data.country)
        .bind(data.sub_account_logo)
        .bind(data.connect_account_id)
        .fetch_one(db)
        .await?;

        Ok(sub_account)
    }

    /// Finds a sub-account by ID
    pub async fn find_by_id(
        db: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sub_account = sqlx::query_as::<_, SubAccount>(&format!(
            "SELECT {SUB_ACCOUNT_COLUMNS} FROM sub_accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(sub_account)
    }

    /// Lists all sub-accounts owned by an agency
    pub async fn list_by_agency(
        db: impl PgExecutor<'_>,
        agency_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sub_accounts = sqlx::query_as::<_, SubAccount>(&format!(
            "SELECT {SUB_ACCOUNT_COLUMNS} FROM sub_accounts WHERE agency_id = $1 \
             ORDER BY created_at ASC"
        ))
        .bind(agency_id)
        .fetch_all(db)
        .await?;

        Ok(sub_accounts)
    }

    /// Deletes a sub-account by ID
    ///
    /// Returns true if the sub-account was deleted, false if it didn't exist.
    pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sub_accounts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_payload_fresh_record_has_no_id() {
        let data = UpsertSubAccount {
            id: None,
            agency_id: Uuid::new_v4(),
            name: "North Region".to_string(),
            company_email: "north@example.com".to_string(),
            company_phone: None,
            address: None,
            city: None,
            zip_code: None,
            state: None,
            country: None,
            sub_account_logo: None,
            connect_account_id: None,
        };

        assert!(data.id.is_none());
    }

    // Integration tests for database operations require a running database
    // and live in the tests/ directory.
}
