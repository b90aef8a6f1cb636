/// Activity feed endpoint
///
/// # Endpoints
///
/// - `GET /v1/agencies/:agency_id/notifications` - Paginated activity feed,
///   newest first, with acting users joined

use crate::{app::AppState, error::ApiResult};
use atrium_shared::identity::authorization::require_membership;
use atrium_shared::identity::VerifiedIdentity;
use atrium_shared::models::notification::{Notification, NotificationWithUser};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Page size (default 50, capped at 200)
    pub limit: Option<i64>,

    /// Number of entries to skip
    pub offset: Option<i64>,
}

/// Lists the agency's activity notifications (any member)
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Query(query): Query<FeedQuery>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> ApiResult<Json<Vec<NotificationWithUser>>> {
    require_membership(&state.db, agency_id, &identity).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let notifications =
        Notification::list_for_agency(&state.db, agency_id, limit, offset).await?;

    Ok(Json(notifications))
}
