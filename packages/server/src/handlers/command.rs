use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Form, Json};
use chrono::{DateTime, Utc};
use common::command::{AjaxResponse, NOT_AJAX_MESSAGE, VoteCommand};
use common::{Denial, ForumRules, PostKind};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::body::{AppForm, AppJson};
use crate::models::command::*;
use crate::services::accept::{AcceptOutcome, AcceptService};
use crate::services::favorite::FavoriteService;
use crate::services::flag::{FlagOutcome, FlagService};
use crate::services::message::MessageService;
use crate::services::moderation::{DeleteOutcome, ModerationService};
use crate::services::subscription::SubscriptionService;
use crate::services::tag::TagService;
use crate::services::vote::VoteService;
use crate::state::AppState;

const TOGGLE_IGNORED_QUESTIONS: &str = "toggle-ignored-questions";

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("X-Requested-With")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest")
}

fn answer_id(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation("postId must be an answer id".into()))
}

/// Map a failed command onto the ajax envelope.
fn ajax_failure(command: VoteCommand, err: AppError) -> AjaxResponse {
    let mut resp = AjaxResponse::failure(err.code(), err.public_message());
    if let AppError::PermissionDenied(denial) = &err {
        resp.allowed = match command {
            VoteCommand::RemoveQuestion | VoteCommand::RemoveAnswer => -2,
            _ => denial.allowed_code(),
        };
        if matches!(denial, Denial::VoteTooOld) {
            resp.status = 2;
        }
    }
    resp
}

async fn run_vote_command<C: ConnectionTrait>(
    conn: &C,
    rules: &ForumRules,
    user_id: i32,
    question_id: i32,
    command: VoteCommand,
    post_id: &str,
    now: DateTime<Utc>,
) -> Result<AjaxResponse, AppError> {
    let mut resp = AjaxResponse::default();

    if let Some((kind, direction)) = command.vote() {
        let target = match kind {
            PostKind::Question => question_id,
            PostKind::Answer => answer_id(post_id)?,
        };
        let outcome = VoteService::new(conn, rules)
            .process_vote(user_id, kind, target, direction, now)
            .await?;
        resp.count = outcome.score;
        if outcome.transition.is_cancel() {
            resp.status = 1;
        }
        if let Some(message) = outcome.message {
            resp.push_message(&message);
        }
        return Ok(resp);
    }

    match command {
        VoteCommand::AcceptAnswer => {
            let outcome = AcceptService::new(conn, rules)
                .toggle(user_id, answer_id(post_id)?, now)
                .await?;
            if outcome == AcceptOutcome::Unaccepted {
                resp.status = 1;
            }
        }
        VoteCommand::Favorite => {
            let outcome = FavoriteService::new(conn)
                .toggle(user_id, question_id, now)
                .await?;
            resp.count = outcome.count;
            if !outcome.added {
                resp.status = 1;
            }
        }
        VoteCommand::FlagQuestion | VoteCommand::FlagAnswer => {
            let (kind, target) = if command.targets_answer() {
                (PostKind::Answer, answer_id(post_id)?)
            } else {
                (PostKind::Question, question_id)
            };
            match FlagService::new(conn, rules)
                .flag(user_id, kind, target, now)
                .await?
            {
                FlagOutcome::AlreadyFlagged => resp.status = 1,
                FlagOutcome::Flagged { count } => resp.count = count,
            }
        }
        VoteCommand::RemoveQuestion | VoteCommand::RemoveAnswer => {
            let (kind, target) = if command.targets_answer() {
                (PostKind::Answer, answer_id(post_id)?)
            } else {
                (PostKind::Question, question_id)
            };
            let outcome = ModerationService::new(conn, rules)
                .toggle_delete(user_id, kind, target, now)
                .await?;
            if outcome == DeleteOutcome::Restored {
                resp.status = 1;
            }
        }
        VoteCommand::SubscribeQuestion => {
            let messages = SubscriptionService::new(conn, rules)
                .subscribe(user_id, question_id, now)
                .await?;
            for message in &messages {
                resp.push_message(message);
            }
        }
        VoteCommand::UnsubscribeQuestion => {
            SubscriptionService::new(conn, rules)
                .unsubscribe(user_id, question_id)
                .await?;
        }
        // Vote commands returned above.
        _ => {}
    }
    Ok(resp)
}

#[utoipa::path(
    post,
    path = "/questions/{id}/vote",
    tag = "Commands",
    operation_id = "voteCommand",
    summary = "Run a numeric ajax command on a question",
    description = "Votes, accepts, favorites, flags, deletes and subscriptions share this endpoint. \
        `type` selects the command; `postId` names the answer for answer-scoped commands. \
        The response is always HTTP 200; `success = 0` signals failure and `code` names its kind.",
    params(
        ("id" = i32, Path, description = "Question ID"),
        ("X-Requested-With" = String, Header, description = "Must be `XMLHttpRequest`"),
    ),
    request_body(content = VoteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Command outcome", body = AjaxResponse),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, headers, form))]
pub async fn vote(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    form: Result<Form<VoteForm>, FormRejection>,
) -> Json<AjaxResponse> {
    if !is_ajax(&headers) {
        return Json(AjaxResponse {
            success: 0,
            message: NOT_AJAX_MESSAGE.into(),
            ..Default::default()
        });
    }

    let form = form.map(|Form(f)| f).unwrap_or_default();
    let command: VoteCommand = match form.command.parse() {
        Ok(command) => command,
        Err(unsupported) => {
            return Json(AjaxResponse::failure(
                "VALIDATION_ERROR",
                unsupported.to_string(),
            ));
        }
    };

    let Some(user) = viewer else {
        return Json(AjaxResponse {
            allowed: 0,
            ..AjaxResponse::failure(
                "PERMISSION_DENIED",
                Denial::Anonymous(command.anonymous_verb()).to_string(),
            )
        });
    };

    let result = async {
        let txn = state.db.begin().await?;
        let resp = run_vote_command(
            &txn,
            &state.config.forum,
            user.user_id,
            id,
            command,
            &form.post_id,
            Utc::now(),
        )
        .await?;
        txn.commit().await?;
        Ok::<_, AppError>(resp)
    }
    .await;

    match result {
        Ok(resp) => Json(resp),
        Err(err) => {
            tracing::debug!(user_id = user.user_id, code = command.code(), error = ?err, "ajax command failed");
            Json(ajax_failure(command, err))
        }
    }
}

#[utoipa::path(
    post,
    path = "/tags/{tag}/mark",
    tag = "Commands",
    operation_id = "markTag",
    summary = "Mark a tag as interesting or ignored",
    description = "`action = remove` clears the caller's mark. Unknown tags are ignored.",
    params(("tag" = String, Path, description = "Tag name")),
    request_body = TagMarkRequest,
    responses(
        (status = 200, description = "Mark saved; body is an empty JSON string", body = String),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn mark_tag(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tag): Path<String>,
    AppJson(payload): AppJson<TagMarkRequest>,
) -> Result<Json<&'static str>, AppError> {
    let reason = validate_tag_mark(&payload)?;
    TagService::new(&state.db)
        .mark(auth_user.user_id, &tag, reason)
        .await?;
    Ok(Json(""))
}

#[utoipa::path(
    post,
    path = "/commands",
    tag = "Commands",
    operation_id = "runCommand",
    summary = "Run a named account command",
    description = "`toggle-ignored-questions` flips whether questions with ignored tags are hidden and returns the new value.",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "New setting value", body = bool),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Missing or unknown command (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn run_command(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CommandRequest>,
) -> Result<Json<bool>, AppError> {
    match payload.command.as_deref() {
        Some(TOGGLE_IGNORED_QUESTIONS) => {
            let hide = TagService::new(&state.db)
                .toggle_ignored_questions(auth_user.user_id)
                .await?;
            Ok(Json(hide))
        }
        _ => Err(AppError::forbidden("Unsupported command")),
    }
}

#[utoipa::path(
    post,
    path = "/messages/read",
    tag = "Commands",
    operation_id = "readMessages",
    summary = "Dismiss pending user messages",
    description = "Deletes the caller's pending messages. Anonymous callers get an empty response.",
    request_body(content = MessagesReadForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Messages cleared"),
        (status = 400, description = "formdata is not `required` (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, form))]
pub async fn read_messages(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    AppForm(form): AppForm<MessagesReadForm>,
) -> Result<StatusCode, AppError> {
    if form.formdata != "required" {
        return Err(AppError::Validation("formdata must be 'required'".into()));
    }
    if let Some(user) = viewer {
        let cleared = MessageService::new(&state.db).clear(user.user_id).await?;
        tracing::debug!(user_id = user.user_id, cleared, "messages read");
    }
    Ok(StatusCode::OK)
}
