#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of votable, flaggable, commentable post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question"))]
    Question,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "answer"))]
    Answer,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a question was closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")
)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "duplicate"))]
    Duplicate,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "off_topic"))]
    OffTopic,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "subjective"))]
    Subjective,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "not_a_question"))]
    NotAQuestion,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "answered"))]
    Answered,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "outdated"))]
    Outdated,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "offensive"))]
    Offensive,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "spam"))]
    Spam,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "too_localized"))]
    TooLocalized,
}

impl CloseReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate question",
            Self::OffTopic => "question is off-topic or not relevant",
            Self::Subjective => "too subjective and argumentative",
            Self::NotAQuestion => "not a real question",
            Self::Answered => "the question is answered, right answer was accepted",
            Self::Outdated => "question is not relevant or outdated",
            Self::Offensive => "question contains offensive or malicious remarks",
            Self::Spam => "spam or advertising",
            Self::TooLocalized => "too localized",
        }
    }
}
