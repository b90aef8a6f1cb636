/// User endpoints
///
/// # Endpoints
///
/// - `GET /v1/me` - Current user with agency context
/// - `PUT /v1/users/:user_id/role` - Change a user's role (admin or owner)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use atrium_shared::activity::record_activity;
use atrium_shared::identity::authorization::require_agency_role;
use atrium_shared::identity::VerifiedIdentity;
use atrium_shared::models::agency::Agency;
use atrium_shared::models::sub_account::SubAccount;
use atrium_shared::models::user::{Role, User};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Current user with the tenant context the dashboard shell needs
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    /// The local user record
    pub user: User,

    /// Owning agency, when bound
    pub agency: Option<Agency>,

    /// The agency's sub-accounts
    pub sub_accounts: Vec<SubAccount>,
}

/// Role-change request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role for the target user
    pub role: Role,
}

/// Returns the current user's details with agency and sub-accounts
pub async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = User::find_by_email(&state.db, &identity.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user record for this identity".to_string()))?;

    let (agency, sub_accounts) = match user.agency_id {
        Some(agency_id) => {
            let agency = Agency::find_by_id(&state.db, agency_id).await?;
            let sub_accounts = SubAccount::list_by_agency(&state.db, agency_id).await?;
            (agency, sub_accounts)
        }
        None => (None, Vec::new()),
    };

    Ok(Json(CurrentUserResponse {
        user,
        agency,
        sub_accounts,
    }))
}

/// Changes a user's role within their agency (admin or owner)
///
/// Ownership is not transferable here: requests that would assign or
/// overwrite the `agency_owner` role are rejected. The local role change
/// and the provider metadata propagation commit together, so downstream
/// authorization checks never observe a half-applied change.
pub async fn update_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<User>> {
    if req.role == Role::AgencyOwner {
        return Err(ApiError::BadRequest(
            "The owner role is assigned at agency creation and cannot be granted here"
                .to_string(),
        ));
    }

    let target = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if target.role == Role::AgencyOwner {
        return Err(ApiError::BadRequest(
            "The owner's role cannot be changed".to_string(),
        ));
    }

    let agency_id = target
        .agency_id
        .ok_or_else(|| ApiError::BadRequest("User is not bound to an agency".to_string()))?;

    require_agency_role(&state.db, agency_id, &identity, Role::AgencyAdmin).await?;

    let mut tx = state.db.begin().await?;

    let updated = User::update_role(&mut *tx, user_id, req.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    state
        .identity
        .assign_role(&updated.identity_id, updated.role)
        .await?;

    tx.commit().await?;

    let description = format!("updated the role of {} | {}", updated.name, updated.role.as_str());
    if let Err(e) = record_activity(
        &state.db,
        Some(&identity),
        &description,
        Some(agency_id),
        None,
    )
    .await
    {
        warn!("Failed to record activity entry: {}", e);
    }

    Ok(Json(updated))
}
