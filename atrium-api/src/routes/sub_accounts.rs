/// Sub-account endpoints
///
/// # Endpoints
///
/// - `POST /v1/agencies/:agency_id/subaccounts` - Create or update a sub-account
/// - `GET /v1/agencies/:agency_id/subaccounts` - List the agency's sub-accounts

use crate::{app::AppState, error::ApiResult};
use atrium_shared::activity::record_activity;
use atrium_shared::identity::authorization::{require_agency_role, require_membership};
use atrium_shared::identity::VerifiedIdentity;
use atrium_shared::models::sub_account::{SubAccount, UpsertSubAccount};
use atrium_shared::models::user::Role;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

/// Sub-account settings form payload
///
/// The form submits the full record; `id` is present when editing an
/// existing sub-account.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertSubAccountRequest {
    /// Existing sub-account id, when editing
    pub id: Option<Uuid>,

    /// Sub-account display name
    #[validate(length(min = 2, max = 255, message = "Name must be at least 2 characters"))]
    pub name: String,

    /// Contact email
    #[validate(email(message = "Invalid email format"))]
    pub company_email: String,

    /// Contact phone
    #[validate(length(max = 64, message = "Phone number too long"))]
    pub company_phone: Option<String>,

    /// Street address
    #[validate(length(max = 255, message = "Address too long"))]
    pub address: Option<String>,

    /// City
    #[validate(length(max = 128, message = "City too long"))]
    pub city: Option<String>,

    /// Postal code
    #[validate(length(max = 32, message = "Zip code too long"))]
    pub zip_code: Option<String>,

    /// State/region
    #[validate(length(max = 128, message = "State too long"))]
    pub state: Option<String>,

    /// Country
    #[validate(length(max = 128, message = "Country too long"))]
    pub country: Option<String>,

    /// Branding logo reference
    #[validate(length(max = 512, message = "Logo reference too long"))]
    pub sub_account_logo: Option<String>,
}

/// Creates or updates a sub-account (admin or owner)
///
/// The activity entry is recorded against the sub-account only; the
/// writer resolves the owning agency from it. A failed append is logged
/// and swallowed.
pub async fn upsert_sub_account(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
    Json(req): Json<UpsertSubAccountRequest>,
) -> ApiResult<(StatusCode, Json<SubAccount>)> {
    req.validate()?;

    require_agency_role(&state.db, agency_id, &identity, Role::AgencyAdmin).await?;

    let created = req.id.is_none();
    let sub_account = SubAccount::upsert(
        &state.db,
        UpsertSubAccount {
            id: req.id,
            agency_id,
            name: req.name,
            company_email: req.company_email,
            company_phone: req.company_phone,
            address: req.address,
            city: req.city,
            zip_code: req.zip_code,
            state: req.state,
            country: req.country,
            sub_account_logo: req.sub_account_logo,
            connect_account_id: None,
        },
    )
    .await?;

    let description = format!("updated sub account | {}", sub_account.name);
    if let Err(e) = record_activity(
        &state.db,
        Some(&identity),
        &description,
        None,
        Some(sub_account.id),
    )
    .await
    {
        warn!("Failed to record activity entry: {}", e);
    }

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(sub_account)))
}

/// Lists the agency's sub-accounts (any member)
pub async fn list_sub_accounts(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> ApiResult<Json<Vec<SubAccount>>> {
    require_membership(&state.db, agency_id, &identity).await?;

    let sub_accounts = SubAccount::list_by_agency(&state.db, agency_id).await?;

    Ok(Json(sub_accounts))
}
