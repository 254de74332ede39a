use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::PostKind;
use sea_orm::TransactionTrait;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::body::AppJson;
use crate::models::question::*;
use crate::services::content::{ContentService, NewQuestion, QuestionEdit};
use crate::services::moderation::ModerationService;
use crate::services::notify;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/questions",
    tag = "Questions",
    operation_id = "askQuestion",
    summary = "Ask a question",
    description = "Creates a question, creates missing tags and makes the author follow it.",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Blocked or suspended (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tags = validate_create_question(&payload)?;

    let txn = state.db.begin().await?;
    let posted = ContentService::new(&txn, &state.config.forum)
        .ask(
            auth_user.user_id,
            NewQuestion {
                title: payload.title,
                body: payload.body,
                tags,
                wiki: payload.wiki,
            },
            chrono::Utc::now(),
        )
        .await?;
    txn.commit().await?;

    notify::dispatch(state.db.clone(), state.mailer.clone(), posted.emails);
    Ok((
        StatusCode::CREATED,
        Json(QuestionResponse::from(posted.model)),
    ))
}

#[utoipa::path(
    get,
    path = "/questions/{id}",
    tag = "Questions",
    operation_id = "getQuestion",
    summary = "Read a question thread",
    description = "Returns the question with its live answers and comments. An authenticated caller's visit is recorded and the responses it covers are marked seen.",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question thread", body = ThreadResponse),
        (status = 401, description = "Bad token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer))]
pub async fn get_question(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ThreadResponse>, AppError> {
    let thread = ContentService::new(&state.db, &state.config.forum)
        .load_thread(id)
        .await?;

    if let Some(viewer) = viewer {
        let txn = state.db.begin().await?;
        ContentService::new(&txn, &state.config.forum)
            .visit_question(viewer.user_id, id, chrono::Utc::now())
            .await?;
        txn.commit().await?;
    }

    Ok(Json(ThreadResponse::from(thread)))
}

#[utoipa::path(
    patch,
    path = "/questions/{id}",
    tag = "Questions",
    operation_id = "updateQuestion",
    summary = "Edit a question",
    description = "Author, moderators and administrators may edit. Changing tags re-counts tag usage.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not allowed to edit (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let tags = validate_update_question(&payload)?;

    let txn = state.db.begin().await?;
    let posted = ContentService::new(&txn, &state.config.forum)
        .edit_question(
            auth_user.user_id,
            id,
            QuestionEdit {
                title: payload.title,
                body: payload.body,
                tags,
            },
            chrono::Utc::now(),
        )
        .await?;
    txn.commit().await?;

    notify::dispatch(state.db.clone(), state.mailer.clone(), posted.emails);
    Ok(Json(QuestionResponse::from(posted.model)))
}

#[utoipa::path(
    post,
    path = "/questions/{id}/close",
    tag = "Questions",
    operation_id = "closeQuestion",
    summary = "Close a question",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = CloseQuestionRequest,
    responses(
        (status = 200, description = "Question closed", body = QuestionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not enough reputation (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already closed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn close_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CloseQuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let txn = state.db.begin().await?;
    let question = ModerationService::new(&txn, &state.config.forum)
        .close(auth_user.user_id, id, payload.reason, chrono::Utc::now())
        .await?;
    txn.commit().await?;

    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    post,
    path = "/questions/{id}/reopen",
    tag = "Questions",
    operation_id = "reopenQuestion",
    summary = "Reopen a closed question",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question reopened", body = QuestionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not allowed to reopen (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Not closed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn reopen_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<QuestionResponse>, AppError> {
    let txn = state.db.begin().await?;
    let question = ModerationService::new(&txn, &state.config.forum)
        .reopen(auth_user.user_id, id)
        .await?;
    txn.commit().await?;

    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    post,
    path = "/questions/{id}/answers",
    tag = "Answers",
    operation_id = "answerQuestion",
    summary = "Answer a question",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = CreateAnswerRequest,
    responses(
        (status = 201, description = "Answer created", body = AnswerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Question closed or account barred (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_answer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_answer_body(&payload.body)?;

    let txn = state.db.begin().await?;
    let posted = ContentService::new(&txn, &state.config.forum)
        .answer(
            auth_user.user_id,
            id,
            payload.body,
            payload.follow,
            chrono::Utc::now(),
        )
        .await?;
    txn.commit().await?;

    notify::dispatch(state.db.clone(), state.mailer.clone(), posted.emails);
    Ok((StatusCode::CREATED, Json(AnswerResponse::from(posted.model))))
}

#[utoipa::path(
    patch,
    path = "/answers/{id}",
    tag = "Answers",
    operation_id = "updateAnswer",
    summary = "Edit an answer",
    params(("id" = i32, Path, description = "Answer ID")),
    request_body = UpdateAnswerRequest,
    responses(
        (status = 200, description = "Answer updated", body = AnswerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not allowed to edit (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Answer not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_answer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    validate_answer_body(&payload.body)?;

    let txn = state.db.begin().await?;
    let posted = ContentService::new(&txn, &state.config.forum)
        .edit_answer(auth_user.user_id, id, payload.body, chrono::Utc::now())
        .await?;
    txn.commit().await?;

    notify::dispatch(state.db.clone(), state.mailer.clone(), posted.emails);
    Ok(Json(AnswerResponse::from(posted.model)))
}

async fn post_comment(
    state: AppState,
    auth_user: AuthUser,
    kind: PostKind,
    post_id: i32,
    payload: CreateCommentRequest,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    validate_create_comment(&payload)?;

    let txn = state.db.begin().await?;
    let posted = ContentService::new(&txn, &state.config.forum)
        .comment(
            auth_user.user_id,
            kind,
            post_id,
            payload.body.trim().to_string(),
            chrono::Utc::now(),
        )
        .await?;
    txn.commit().await?;

    notify::dispatch(state.db.clone(), state.mailer.clone(), posted.emails);
    Ok((StatusCode::CREATED, Json(CommentResponse::from(posted.model))))
}

#[utoipa::path(
    post,
    path = "/questions/{id}/comments",
    tag = "Comments",
    operation_id = "commentQuestion",
    summary = "Comment on a question",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn comment_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    post_comment(state, auth_user, PostKind::Question, id, payload).await
}

#[utoipa::path(
    post,
    path = "/answers/{id}/comments",
    tag = "Comments",
    operation_id = "commentAnswer",
    summary = "Comment on an answer",
    params(("id" = i32, Path, description = "Answer ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Answer not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn comment_answer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    post_comment(state, auth_user, PostKind::Answer, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author or staff (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let txn = state.db.begin().await?;
    ContentService::new(&txn, &state.config.forum)
        .delete_comment(auth_user.user_id, id)
        .await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
