/// Agency endpoints
///
/// Agencies are the tenant roots. This module covers their lifecycle:
/// creation (which also provisions the owner), detail updates from the
/// settings form, the dashboard goal, and deletion.
///
/// # Endpoints
///
/// - `POST /v1/agencies` - Create an agency and provision its owner
/// - `PUT /v1/agencies/:agency_id` - Update agency details
/// - `PUT /v1/agencies/:agency_id/goal` - Update the sub-account goal
/// - `DELETE /v1/agencies/:agency_id` - Delete the agency (owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use atrium_shared::activity::record_activity;
use atrium_shared::identity::authorization::{require_agency_role, require_membership};
use atrium_shared::identity::VerifiedIdentity;
use atrium_shared::models::agency::{Agency, CreateAgency, UpdateAgency};
use atrium_shared::models::user::{CreateUser, Role, User};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

/// Create-agency request (the agency details form)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgencyRequest {
    /// Agency display name
    #[validate(length(min = 2, max = 255, message = "Agency name must be at least 2 characters"))]
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
    pub agency_logo: Option<String>,

    /// White-label flag
    #[serde(default)]
    pub white_label: bool,
}

/// Update-agency request; only supplied fields change
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAgencyRequest {
    #[validate(length(min = 2, max = 255, message = "Agency name must be at least 2 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub company_email: Option<String>,

    #[validate(length(max = 64, message = "Phone number too long"))]
    pub company_phone: Option<String>,

    #[validate(length(max = 255, message = "Address too long"))]
    pub address: Option<String>,

    #[validate(length(max = 128, message = "City too long"))]
    pub city: Option<String>,

    #[validate(length(max = 32, message = "Zip code too long"))]
    pub zip_code: Option<String>,

    #[validate(length(max = 128, message = "State too long"))]
    pub state: Option<String>,

    #[validate(length(max = 128, message = "Country too long"))]
    pub country: Option<String>,

    #[validate(length(max = 512, message = "Logo reference too long"))]
    pub agency_logo: Option<String>,

    pub white_label: Option<bool>,

    #[validate(length(max = 255, message = "Billing account reference too long"))]
    pub connect_account_id: Option<String>,
}

/// Update-goal request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    /// New sub-account goal
    #[validate(range(min = 1, max = 10000, message = "Goal must be between 1 and 10000"))]
    pub goal: i32,
}

/// Create-agency response
#[derive(Debug, Serialize)]
pub struct CreateAgencyResponse {
    /// The created agency
    pub agency: Agency,

    /// The provisioned (or rebound) owner user
    pub owner: User,
}

/// Creates an agency and provisions the calling identity as its owner
///
/// Agency creation is the only path that assigns the `agency_owner` role;
/// invitations never mint owners. An identity that already has a user
/// record is rebound to the new agency instead of duplicated. The owner
/// role is propagated to the identity provider before the transaction
/// commits, so a provider failure leaves nothing behind.
pub async fn create_agency(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Json(req): Json<CreateAgencyRequest>,
) -> ApiResult<(StatusCode, Json<CreateAgencyResponse>)> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let agency = Agency::create(
        &mut *tx,
        CreateAgency {
            name: req.name,
            company_email: req.company_email,
            company_phone: req.company_phone,
            address: req.address,
            city: req.city,
            zip_code: req.zip_code,
            state: req.state,
            country: req.country,
            agency_logo: req.agency_logo,
            white_label: req.white_label,
            connect_account_id: None,
        },
    )
    .await?;

    let owner = match User::create_if_absent(
        &mut *tx,
        CreateUser {
            identity_id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.display_name(),
            avatar_url: identity.avatar_url.clone(),
            role: Role::AgencyOwner,
            agency_id: Some(agency.id),
        },
    )
    .await?
    {
        Some(user) => user,
        None => User::bind_to_agency(&mut *tx, &identity.email, agency.id, Role::AgencyOwner)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?,
    };

    state
        .identity
        .assign_role(&identity.id, Role::AgencyOwner)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAgencyResponse { agency, owner }),
    ))
}

/// Updates agency details (admin or owner)
pub async fn update_agency(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
    Json(req): Json<UpdateAgencyRequest>,
) -> ApiResult<Json<Agency>> {
    req.validate()?;

    require_agency_role(&state.db, agency_id, &identity, Role::AgencyAdmin).await?;

    let agency = Agency::update(
        &state.db,
        agency_id,
        UpdateAgency {
            name: req.name,
            company_email: req.company_email,
            company_phone: req.company_phone,
            address: req.address,
            city: req.city,
            zip_code: req.zip_code,
            state: req.state,
            country: req.country,
            agency_logo: req.agency_logo,
            white_label: req.white_label,
            connect_account_id: req.connect_account_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Agency not found".to_string()))?;

    Ok(Json(agency))
}

/// Updates the agency's sub-account goal (any member)
///
/// Records an activity entry; a failed append is logged and swallowed —
/// the audit trail is best effort and never blocks the settings change.
pub async fn update_goal(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
    Json(req): Json<UpdateGoalRequest>,
) -> ApiResult<Json<Agency>> {
    req.validate()?;

    require_membership(&state.db, agency_id, &identity).await?;

    let agency = Agency::update_goal(&state.db, agency_id, req.goal)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agency not found".to_string()))?;

    let description = format!("Updated the agency goal to | {} Sub Account", agency.goal);
    if let Err(e) = record_activity(
        &state.db,
        Some(&identity),
        &description,
        Some(agency.id),
        None,
    )
    .await
    {
        warn!("Failed to record activity entry: {}", e);
    }

    Ok(Json(agency))
}

/// Deletes the agency and everything under it (owner only)
pub async fn delete_agency(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> ApiResult<StatusCode> {
    require_agency_role(&state.db, agency_id, &identity, Role::AgencyOwner).await?;

    let deleted = Agency::delete(&state.db, agency_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Agency not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
