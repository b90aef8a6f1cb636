/// Session establishment endpoint
///
/// Called once per session establishment by the dashboard shell. Resolves
/// the authenticated identity's tenant membership, consuming a pending
/// invitation when one exists (see `atrium_shared::onboarding`).
///
/// # Endpoint
///
/// ```text
/// POST /v1/session
/// Authorization: Bearer <session token>
/// ```
///
/// # Response
///
/// ```json
/// { "binding": { "agency_id": "…", "role": "agency_admin" } }
/// ```
///
/// `binding` is null for identities with no invitation and no bound user;
/// the dashboard sends those to agency creation.

use crate::{app::AppState, error::ApiResult};
use atrium_shared::identity::VerifiedIdentity;
use atrium_shared::onboarding::{resolve_membership, TenantBinding};
use axum::{extract::State, Extension, Json};
use serde::Serialize;

/// Session establishment response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The resolved tenant membership, if any
    pub binding: Option<TenantBinding>,
}

/// Session establishment handler
///
/// # Errors
///
/// Transient store or identity-provider failures surface as 5xx; the
/// dashboard retries the whole page load. No partial onboarding state is
/// ever persisted on failure.
pub async fn establish_session(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> ApiResult<Json<SessionResponse>> {
    let binding = resolve_membership(&state.db, state.identity.as_ref(), &identity).await?;

    Ok(Json(SessionResponse { binding }))
}
