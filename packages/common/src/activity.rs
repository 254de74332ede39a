#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of trackable event recorded in the activity log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ask_question"))]
    AskQuestion,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "answer"))]
    Answer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment_question"))]
    CommentQuestion,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment_answer"))]
    CommentAnswer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "update_question"))]
    UpdateQuestion,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "update_answer"))]
    UpdateAnswer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "prize"))]
    Prize,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mark_answer"))]
    MarkAnswer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "vote_up"))]
    VoteUp,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "vote_down"))]
    VoteDown,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "cancel_vote"))]
    CancelVote,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "delete_question"))]
    DeleteQuestion,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "delete_answer"))]
    DeleteAnswer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mark_offensive"))]
    MarkOffensive,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "update_tags"))]
    UpdateTags,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "favorite"))]
    Favorite,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "user_full_updated"))]
    UserFullUpdated,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "email_update_sent"))]
    EmailUpdateSent,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mention"))]
    Mention,
}

impl ActivityType {
    /// Activities shown to receivers as "responses" and cleared on visit.
    pub const RESPONSE_TYPES: &'static [ActivityType] = &[
        Self::Answer,
        Self::CommentQuestion,
        Self::CommentAnswer,
        Self::UpdateQuestion,
        Self::UpdateAnswer,
        Self::MarkAnswer,
        Self::Mention,
    ];

    /// Activities that trigger an instant email to subscribers.
    pub const INSTANT_NOTIFICATION_TYPES: &'static [ActivityType] = &[
        Self::AskQuestion,
        Self::Answer,
        Self::CommentQuestion,
        Self::CommentAnswer,
        Self::UpdateQuestion,
        Self::UpdateAnswer,
        Self::Mention,
    ];

    pub fn is_response(&self) -> bool {
        Self::RESPONSE_TYPES.contains(self)
    }

    pub fn sends_instant_email(&self) -> bool {
        Self::INSTANT_NOTIFICATION_TYPES.contains(self)
    }

    /// Whether recording this activity should refresh the actor's `last_seen`.
    pub fn touches_last_seen(&self) -> bool {
        !matches!(self, Self::EmailUpdateSent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AskQuestion => "ask_question",
            Self::Answer => "answer",
            Self::CommentQuestion => "comment_question",
            Self::CommentAnswer => "comment_answer",
            Self::UpdateQuestion => "update_question",
            Self::UpdateAnswer => "update_answer",
            Self::Prize => "prize",
            Self::MarkAnswer => "mark_answer",
            Self::VoteUp => "vote_up",
            Self::VoteDown => "vote_down",
            Self::CancelVote => "cancel_vote",
            Self::DeleteQuestion => "delete_question",
            Self::DeleteAnswer => "delete_answer",
            Self::MarkOffensive => "mark_offensive",
            Self::UpdateTags => "update_tags",
            Self::Favorite => "favorite",
            Self::UserFullUpdated => "user_full_updated",
            Self::EmailUpdateSent => "email_update_sent",
            Self::Mention => "mention",
        }
    }

    /// Short description used in email subjects and the notification feed.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::AskQuestion => "new question",
            Self::Answer => "new answer",
            Self::CommentQuestion => "new comment on a question",
            Self::CommentAnswer => "new comment on an answer",
            Self::UpdateQuestion => "question updated",
            Self::UpdateAnswer => "answer updated",
            Self::Prize => "badge awarded",
            Self::MarkAnswer => "answer accepted",
            Self::VoteUp => "upvote",
            Self::VoteDown => "downvote",
            Self::CancelVote => "vote canceled",
            Self::DeleteQuestion => "question deleted",
            Self::DeleteAnswer => "answer deleted",
            Self::MarkOffensive => "post flagged",
            Self::UpdateTags => "tags updated",
            Self::Favorite => "question favorited",
            Self::UserFullUpdated => "profile updated",
            Self::EmailUpdateSent => "email update sent",
            Self::Mention => "you were mentioned",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of row an activity points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")
)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question"))]
    Question,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "answer"))]
    Answer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment"))]
    Comment,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "vote"))]
    Vote,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "award"))]
    Award,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "favorite_question"))]
    FavoriteQuestion,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "user"))]
    User,
}

impl From<crate::PostKind> for TargetKind {
    fn from(kind: crate::PostKind) -> Self {
        match kind {
            crate::PostKind::Question => Self::Question,
            crate::PostKind::Answer => Self::Answer,
        }
    }
}
