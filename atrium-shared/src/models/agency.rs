/// Agency model and database operations
///
/// This module provides the Agency model, the tenant root of the system.
/// Every sub-account, user, invitation, and notification hangs off an
/// agency, and deleting an agency cascades to all of them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE agencies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     company_email VARCHAR(255) NOT NULL,
///     company_phone VARCHAR(64),
///     address VARCHAR(255),
///     city VARCHAR(128),
///     zip_code VARCHAR(32),
///     state VARCHAR(128),
///     country VARCHAR(128),
///     agency_logo VARCHAR(512),
///     white_label BOOLEAN NOT NULL DEFAULT FALSE,
///     goal INTEGER NOT NULL DEFAULT 5,
///     connect_account_id VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use atrium_shared::models::agency::{Agency, CreateAgency};
/// use atrium_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let agency = Agency::create(&pool, CreateAgency {
///     name: "Acme Digital".to_string(),
///     company_email: "hello@acme.digital".to_string(),
///     ..Default::default()
/// }).await?;
///
/// Agency::update_goal(&pool, agency.id, 12).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Agency model representing a top-level tenant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agency {
    /// Unique agency ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Contact email
    pub company_email: String,

    /// Contact phone
    pub company_phone: Option<String>,

    /// Street address
    pub address: Option<String>,

    /// City
    pub city: Option<String>,

    /// Postal code
    pub zip_code: Option<String>,

    /// State/region
    pub state: Option<String>,

    /// Country
    pub country: Option<String>,

    /// Branding logo reference
    pub agency_logo: Option<String>,

    /// Whether sub-accounts see the agency's branding instead of the platform's
    pub white_label: bool,

    /// Sub-account goal shown on the agency dashboard
    pub goal: i32,

    /// External billing account reference (e.g. a payment-processor account id)
    pub connect_account_id: Option<String>,

    /// When the agency was created
    pub created_at: DateTime<Utc>,

    /// When the agency was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new agency
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAgency {
    /// Display name
    pub name: String,

    /// Contact email
    pub company_email: String,

    /// Contact phone
    pub company_phone: Option<String>,

    /// Street address
    pub address: Option<String>,

    /// City
    pub city: Option<String>,

    /// Postal code
    pub zip_code: Option<String>,

    /// State/region
    pub state: Option<String>,

    /// Country
    pub country: Option<String>,

    /// Branding logo reference
    pub agency_logo: Option<String>,

    /// White-label flag (defaults to false)
    #[serde(default)]
    pub white_label: bool,

    /// External billing account reference
    pub connect_account_id: Option<String>,
}

/// Input for updating an existing agency
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAgency {
    /// New display name
    pub name: Option<String>,

    /// New contact email
    pub company_email: Option<String>,

    /// New contact phone
    pub company_phone: Option<String>,

    /// New street address
    pub address: Option<String>,

    /// New city
    pub city: Option<String>,

    /// New postal code
    pub zip_code: Option<String>,

    /// New state/region
    pub state: Option<String>,

    /// New country
    pub country: Option<String>,

    /// New branding logo reference
    pub agency_logo: Option<String>,

    /// New white-label flag
    pub white_label: Option<bool>,

    /// New external billing account reference
    pub connect_account_id: Option<String>,
}

const AGENCY_COLUMNS: &str = "id, name, company_email, company_phone, address, city, zip_code, \
     state, country, agency_logo, white_label, goal, connect_account_id, created_at, updated_at";

impl Agency {
    /// Creates a new agency in the database
    pub async fn create(db: impl PgExecutor<'_>, data: CreateAgency) -> Result<Self, sqlx::Error> {
        let agency = sqlx::query_as::<_, Agency>(&format!(
            r#"
            INSERT INTO agencies (name, company_email, company_phone, address, city,
                                  zip_code, state, country, agency_logo, white_label,
                                  connect_account_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {AGENCY_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.company_email)
        .bind(data.company_phone)
        .bind(data.address)
        .bind(data.city)
        .bind(data.zip_code)
        .bind(data.state)
        .bind(data.country)
        .bind(data.agency_logo)
        .bind(data.white_label)
        .bind(data.connect_account_id)
        .fetch_one(db)
        .await?;

        Ok(agency)
    }

    /// Finds an agency by ID
    pub async fn find_by_id(
        db: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let agency = sqlx::query_as::<_, Agency>(&format!(
            "SELECT {AGENCY_COLUMNS} FROM agencies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(agency)
    }

    /// Updates an existing agency
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    ///
    /// Returns the updated agency if found, None if the agency doesn't exist.
    pub async fn update(
        db: impl PgExecutor<'_>,
        id: Uuid,
        data: UpdateAgency,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE agencies SET updated_at = NOW()");
        let mut bind_count = 1;

        let text_fields = [
            ("name", data.name.is_some()),
            ("company_email", data.company_email.is_some()),
            ("company_phone", data.company_phone.is_some()),
            ("address", data.address.is_some()),
            ("city", data.city.is_some()),
            ("zip_code", data.zip_code.is_some()),
            ("state", data.state.is_some()),
            ("country", data.country.is_some()),
            ("agency_logo", data.agency_logo.is_some()),
        ];
        for (column, present) in text_fields {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {column} = ${bind_count}"));
            }
        }
        if data.white_label.is_some() {
            bind_count += 1;
            query.push_str(&format!(", white_label = ${bind_count}"));
        }
        if data.connect_account_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", connect_account_id = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {AGENCY_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Agency>(&query).bind(id);

        for value in [
            data.name,
            data.company_email,
            data.company_phone,
            data.address,
            data.city,
            data.zip_code,
            data.state,
            data.country,
            data.agency_logo,
        ]
        .into_iter()
        .flatten()
        {
            q = q.bind(value);
        }
        if let Some(white_label) = data.white_label {
            q = q.bind(white_label);
        }
        if let Some(connect_account_id) = data.connect_account_id {
            q = q.bind(connect_account_id);
        }

        let agency = q.fetch_optional(db).await?;

        Ok(agency)
    }

    /// Updates an agency's sub-account goal
    ///
    /// Returns the updated agency if found, None if the agency doesn't exist.
    pub async fn update_goal(
        db: impl PgExecutor<'_>,
        id: Uuid,
        goal: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let agency = sqlx::query_as::<_, Agency>(&format!(
            r#"
            UPDATE agencies
            SET goal = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {AGENCY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(goal)
        .fetch_optional(db)
        .await?;

        Ok(agency)
    }

    /// Deletes an agency by ID
    ///
    /// This cascades to sub-accounts, users, invitations, and notifications.
    ///
    /// Returns true if the agency was deleted, false if it didn't exist.
    pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM agencies WHERE id = $1")
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
    fn test_create_agency_defaults() {
        let create = CreateAgency {
            name: "Test Agency".to_string(),
            company_email: "team@test.agency".to_string(),
            ..Default::default()
        };

        assert!(!create.white_label);
        assert!(create.connect_account_id.is_none());
    }

    #[test]
    fn test_update_agency_default_is_noop_payload() {
        let update = UpdateAgency::default();
        assert!(update.name.is_none());
        assert!(update.white_label.is_none());
        assert!(update.connect_account_id.is_none());
    }

    // Integration tests for database operations require a running database
    // and live in the tests/ directory.
}
