use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::TransactionTrait;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::body::AppJson;
use crate::models::badge::*;
use crate::services::award::AwardService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/badges",
    tag = "Badges",
    operation_id = "listBadges",
    summary = "List badges",
    responses(
        (status = 200, description = "All badges", body = Vec<BadgeResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_badges(
    State(state): State<AppState>,
) -> Result<Json<Vec<BadgeResponse>>, AppError> {
    let badges = AwardService::new(&state.db).list_badges().await?;
    Ok(Json(badges.into_iter().map(BadgeResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/badges/{id}/awards",
    tag = "Badges",
    operation_id = "awardBadge",
    summary = "Award a badge to a user",
    description = "Moderators and administrators only. The recipient gets a notification and a one-time message.",
    params(("id" = i32, Path, description = "Badge ID")),
    request_body = AwardRequest,
    responses(
        (status = 201, description = "Badge awarded", body = AwardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not staff (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Badge or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Single badge already held (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = payload.user_id))]
pub async fn award_badge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AwardRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let award = AwardService::new(&txn)
        .award(auth_user.user_id, id, payload.user_id, chrono::Utc::now())
        .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(AwardResponse::from(award))))
}
