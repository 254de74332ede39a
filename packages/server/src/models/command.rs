use common::TagMarkReason;
use serde::Deserialize;

use crate::error::AppError;

/// Form body of the vote endpoint.
///
/// Fields stay strings so a malformed value still yields the ajax envelope
/// rather than a rejection.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct VoteForm {
    /// Numeric command code.
    #[serde(rename = "type", default)]
    #[schema(example = "1")]
    pub command: String,
    /// Answer id for answer-scoped commands.
    #[serde(rename = "postId", default)]
    #[schema(example = "17")]
    pub post_id: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TagMarkRequest {
    /// `remove` clears the mark; anything else sets it.
    #[schema(example = "add")]
    pub action: String,
    pub reason: Option<TagMarkReason>,
}

/// Requested mark, or `None` to clear it.
pub fn validate_tag_mark(req: &TagMarkRequest) -> Result<Option<TagMarkReason>, AppError> {
    if req.action == "remove" {
        return Ok(None);
    }
    req.reason
        .map(Some)
        .ok_or_else(|| AppError::Validation("reason must be one of: good, bad".into()))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CommandRequest {
    #[schema(example = "toggle-ignored-questions")]
    pub command: Option<String>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct MessagesReadForm {
    /// Must be `required`.
    #[serde(default)]
    pub formdata: String,
}
