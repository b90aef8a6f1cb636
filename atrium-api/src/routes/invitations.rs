/// Invitation endpoints
///
/// Invitations are single-use membership grants consumed later by the
/// session-establishment flow. Only agency admins (and owners) manage them.
///
/// # Endpoints
///
/// - `POST /v1/agencies/:agency_id/invitations` - Invite an email address
/// - `GET /v1/agencies/:agency_id/invitations` - List pending invitations

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use atrium_shared::activity::record_activity;
use atrium_shared::identity::authorization::require_agency_role;
use atrium_shared::identity::VerifiedIdentity;
use atrium_shared::models::invitation::{CreateInvitation, Invitation};
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

/// Invite request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    /// Email address to invite
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role the invitee will receive on acceptance
    pub role: Role,
}

/// Creates a pending invitation (admin or owner)
///
/// At most one pending invitation can exist per email; a duplicate
/// surfaces as 409. The owner role cannot be granted through invitations.
pub async fn create_invitation(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
    Json(req): Json<CreateInvitationRequest>,
) -> ApiResult<(StatusCode, Json<Invitation>)> {
    req.validate()?;

    if req.role == Role::AgencyOwner {
        return Err(ApiError::BadRequest(
            "The owner role cannot be granted through an invitation".to_string(),
        ));
    }

    require_agency_role(&state.db, agency_id, &identity, Role::AgencyAdmin).await?;

    let invitation = Invitation::create(
        &state.db,
        CreateInvitation {
            email: req.email,
            agency_id,
            role: req.role,
        },
    )
    .await?;

    let description = format!("Invited {}", invitation.email);
    if let Err(e) =
        record_activity(&state.db, Some(&identity), &description, Some(agency_id), None).await
    {
        warn!("Failed to record activity entry: {}", e);
    }

    Ok((StatusCode::CREATED, Json(invitation)))
}

/// Lists the agency's pending invitations (admin or owner)
pub async fn list_invitations(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> ApiResult<Json<Vec<Invitation>>> {
    require_agency_role(&state.db, agency_id, &identity, Role::AgencyAdmin).await?;

    let invitations = Invitation::list_pending_by_agency(&state.db, agency_id).await?;

    Ok(Json(invitations))
}
