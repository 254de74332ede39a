use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::TransactionTrait;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::body::AppJson;
use crate::models::user::*;
use crate::services::activity::ActivityService;
use crate::services::message::MessageService;
use crate::services::moderation::ModerationService;
use crate::services::post::find_user;
use crate::services::reputation::ReputationService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Public user profile",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let user = find_user(&state.db, id).await?;
    Ok(Json(UserProfileResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/status",
    tag = "Users",
    operation_id = "updateUserStatus",
    summary = "Change a user's status",
    description = "Moderators may change non-staff users; administrators anyone but themselves. \
        Any status given to an administrator revokes administrator rights.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not allowed to moderate this user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(status = %payload.status))]
pub async fn update_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let txn = state.db.begin().await?;
    let user = ModerationService::new(&txn, &state.config.forum)
        .set_user_status(auth_user.user_id, id, payload.status)
        .await?;
    txn.commit().await?;

    Ok(Json(UserProfileResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/users/{id}/reputation",
    tag = "Users",
    operation_id = "getReputationHistory",
    summary = "Reputation ledger, newest first",
    params(("id" = i32, Path, description = "User ID"), HistoryQuery),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<ReputeEntry>),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn reputation_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ReputeEntry>>, AppError> {
    find_user(&state.db, id).await?;
    let rows = ReputationService::new(&state.db, state.config.forum.max_rep_gain_per_user_per_day)
        .history(id, query.limit())
        .await?;
    Ok(Json(rows.into_iter().map(ReputeEntry::from).collect()))
}

#[utoipa::path(
    post,
    path = "/users/{id}/reputation",
    tag = "Users",
    operation_id = "moderateReputation",
    summary = "Adjust a user's reputation by hand",
    description = "A zero delta is accepted and changes nothing. The result never drops below 1.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = ModerateReputationRequest,
    responses(
        (status = 200, description = "New balance", body = ReputationResponse),
        (status = 400, description = "Missing comment (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not allowed to moderate this user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(delta = payload.delta))]
pub async fn moderate_reputation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ModerateReputationRequest>,
) -> Result<Json<ReputationResponse>, AppError> {
    validate_moderate_reputation(&payload)?;

    let txn = state.db.begin().await?;
    let change = ModerationService::new(&txn, &state.config.forum)
        .moderate_reputation(
            auth_user.user_id,
            id,
            payload.delta,
            &payload.comment,
            chrono::Utc::now(),
        )
        .await?;
    txn.commit().await?;

    Ok(Json(ReputationResponse {
        reputation: change.reputation,
        applied: change.applied,
    }))
}

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Users",
    operation_id = "listNotifications",
    summary = "Activities still addressed to the caller",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Pending notifications", body = NotificationsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_notifications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<NotificationsResponse>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;
    let rows = ActivityService::new(&state.db)
        .pending_for(user.id, query.limit())
        .await?;
    Ok(Json(NotificationsResponse {
        response_count: user.response_count,
        data: rows.into_iter().map(NotificationItem::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/messages",
    tag = "Users",
    operation_id = "listMessages",
    summary = "Pending one-time messages, oldest first",
    responses(
        (status = 200, description = "Messages", body = Vec<MessageResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let rows = MessageService::new(&state.db).list(auth_user.user_id).await?;
    Ok(Json(rows.into_iter().map(MessageResponse::from).collect()))
}
