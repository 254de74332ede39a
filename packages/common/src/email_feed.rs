#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which slice of activity an email subscription covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
pub enum FeedType {
    /// Entire forum.
    #[serde(rename = "q_all")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "q_all"))]
    AllQuestions,
    /// Questions the user asked.
    #[serde(rename = "q_ask")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "q_ask"))]
    AskedQuestions,
    /// Questions the user answered.
    #[serde(rename = "q_ans")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "q_ans"))]
    AnsweredQuestions,
    /// Questions the user follows.
    #[serde(rename = "q_sel")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "q_sel"))]
    SelectedQuestions,
    /// Mentions and comments on the user's posts.
    #[serde(rename = "m_and_c")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "m_and_c"))]
    MentionsAndComments,
}

impl FeedType {
    pub const ALL: &'static [FeedType] = &[
        Self::AllQuestions,
        Self::AskedQuestions,
        Self::AnsweredQuestions,
        Self::SelectedQuestions,
        Self::MentionsAndComments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllQuestions => "q_all",
            Self::AskedQuestions => "q_ask",
            Self::AnsweredQuestions => "q_ans",
            Self::SelectedQuestions => "q_sel",
            Self::MentionsAndComments => "m_and_c",
        }
    }

    /// Frequency assigned when an account is created.
    pub fn default_frequency(&self) -> EmailFrequency {
        match self {
            Self::AllQuestions | Self::SelectedQuestions => EmailFrequency::Never,
            Self::AskedQuestions | Self::AnsweredQuestions | Self::MentionsAndComments => {
                EmailFrequency::Instant
            }
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")
)]
pub enum EmailFrequency {
    #[serde(rename = "i")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "i"))]
    Instant,
    #[serde(rename = "d")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "d"))]
    Daily,
    #[serde(rename = "w")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "w"))]
    Weekly,
    #[serde(rename = "n")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "n"))]
    Never,
}

impl EmailFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instant => "i",
            Self::Daily => "d",
            Self::Weekly => "w",
            Self::Never => "n",
        }
    }
}

/// What the subscriber has to do with the activity being delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedContext {
    pub asked_question: bool,
    pub answered_question: bool,
    pub follows_question: bool,
    pub mentioned: bool,
    /// The activity is a comment on one of the subscriber's posts.
    pub comment_on_own_post: bool,
}

impl FeedType {
    /// Whether an instant setting of this type covers the given context.
    pub fn applies(&self, ctx: &FeedContext) -> bool {
        match self {
            Self::AllQuestions => true,
            Self::AskedQuestions => ctx.asked_question,
            Self::AnsweredQuestions => ctx.answered_question,
            Self::SelectedQuestions => ctx.follows_question,
            Self::MentionsAndComments => ctx.mentioned || ctx.comment_on_own_post,
        }
    }
}

/// Whether any instant setting in `settings` covers `ctx`.
pub fn wants_instant_email(settings: &[(FeedType, EmailFrequency)], ctx: &FeedContext) -> bool {
    settings
        .iter()
        .any(|(feed, freq)| *freq == EmailFrequency::Instant && feed.applies(ctx))
}
