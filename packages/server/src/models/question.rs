use chrono::{DateTime, Utc};
use common::{CloseReason, PostKind};
use serde::{Deserialize, Serialize};

use crate::entity::{answer, comment, question};
use crate::error::AppError;
use crate::services::content::Thread;

use super::shared::{parse_tags, validate_body, validate_comment, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateQuestionRequest {
    #[schema(example = "How do I borrow a field mutably twice?")]
    pub title: String,
    pub body: String,
    /// Space separated tag names, 1-5 tags.
    #[schema(example = "rust borrow-checker")]
    pub tags: String,
    /// Community wiki posts earn their author no reputation.
    #[serde(default)]
    pub wiki: bool,
}

/// Validate a new question and return its parsed tags.
pub fn validate_create_question(req: &CreateQuestionRequest) -> Result<Vec<String>, AppError> {
    validate_title(&req.title)?;
    validate_body(&req.body)?;
    parse_tags(&req.tags)
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateQuestionRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<String>,
}

/// Validate a question edit and return its parsed tags, if given.
pub fn validate_update_question(
    req: &UpdateQuestionRequest,
) -> Result<Option<Vec<String>>, AppError> {
    if req.title.is_none() && req.body.is_none() && req.tags.is_none() {
        return Err(AppError::Validation("Nothing to update".into()));
    }
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref body) = req.body {
        validate_body(body)?;
    }
    req.tags.as_deref().map(parse_tags).transpose()
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAnswerRequest {
    pub body: String,
    /// Also follow the question for email updates.
    #[serde(default)]
    pub follow: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateAnswerRequest {
    pub body: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    /// 1-600 characters.
    pub body: String,
}

pub fn validate_answer_body(body: &str) -> Result<(), AppError> {
    validate_body(body)
}

pub fn validate_create_comment(req: &CreateCommentRequest) -> Result<(), AppError> {
    validate_comment(&req.body)
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CloseQuestionRequest {
    pub reason: CloseReason,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub body: String,
    /// Tag names in the order given by the author.
    pub tags: Vec<String>,
    pub score: i32,
    pub vote_up_count: i32,
    pub vote_down_count: i32,
    pub answer_count: i32,
    pub comment_count: i32,
    pub favourite_count: i32,
    pub wiki: bool,
    pub closed: bool,
    pub close_reason: Option<CloseReason>,
    pub closed_at: Option<DateTime<Utc>>,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<question::Model> for QuestionResponse {
    fn from(m: question::Model) -> Self {
        Self {
            tags: m.tagnames.split_whitespace().map(str::to_string).collect(),
            id: m.id,
            author_id: m.author_id,
            title: m.title,
            body: m.body,
            score: m.score,
            vote_up_count: m.vote_up_count,
            vote_down_count: m.vote_down_count,
            answer_count: m.answer_count,
            comment_count: m.comment_count,
            favourite_count: m.favourite_count,
            wiki: m.wiki,
            closed: m.closed,
            close_reason: m.close_reason,
            closed_at: m.closed_at,
            last_activity_at: m.last_activity_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AnswerResponse {
    pub id: i32,
    pub question_id: i32,
    pub author_id: i32,
    pub body: String,
    pub score: i32,
    pub vote_up_count: i32,
    pub vote_down_count: i32,
    pub comment_count: i32,
    pub wiki: bool,
    pub accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<answer::Model> for AnswerResponse {
    fn from(m: answer::Model) -> Self {
        Self {
            id: m.id,
            question_id: m.question_id,
            author_id: m.author_id,
            body: m.body,
            score: m.score,
            vote_up_count: m.vote_up_count,
            vote_down_count: m.vote_down_count,
            comment_count: m.comment_count,
            wiki: m.wiki,
            accepted: m.accepted,
            accepted_at: m.accepted_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub post_kind: PostKind,
    pub post_id: i32,
    pub author_id: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<comment::Model> for CommentResponse {
    fn from(m: comment::Model) -> Self {
        Self {
            id: m.id,
            post_kind: m.post_kind,
            post_id: m.post_id,
            author_id: m.author_id,
            body: m.body,
            created_at: m.created_at,
        }
    }
}

/// A question page: the question, its live answers and every comment.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ThreadResponse {
    pub question: QuestionResponse,
    pub answers: Vec<AnswerResponse>,
    pub comments: Vec<CommentResponse>,
}

impl From<Thread> for ThreadResponse {
    fn from(t: Thread) -> Self {
        Self {
            question: t.question.into(),
            answers: t.answers.into_iter().map(Into::into).collect(),
            comments: t.comments.into_iter().map(Into::into).collect(),
        }
    }
}
