//! Numeric ajax command codes and the response envelope they share.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::post_kind::PostKind;
use crate::vote::VoteDirection;

/// Command sent to the vote endpoint as a numeric `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteCommand {
    AcceptAnswer,
    QuestionUpVote,
    QuestionDownVote,
    Favorite,
    AnswerUpVote,
    AnswerDownVote,
    FlagQuestion,
    FlagAnswer,
    RemoveQuestion,
    RemoveAnswer,
    SubscribeQuestion,
    UnsubscribeQuestion,
}

impl VoteCommand {
    pub fn code(&self) -> u8 {
        match self {
            Self::AcceptAnswer => 0,
            Self::QuestionUpVote => 1,
            Self::QuestionDownVote => 2,
            Self::Favorite => 4,
            Self::AnswerUpVote => 5,
            Self::AnswerDownVote => 6,
            Self::FlagQuestion => 7,
            Self::FlagAnswer => 8,
            Self::RemoveQuestion => 9,
            Self::RemoveAnswer => 10,
            Self::SubscribeQuestion => 11,
            Self::UnsubscribeQuestion => 12,
        }
    }

    /// Vote target and direction for the four vote commands.
    pub fn vote(&self) -> Option<(PostKind, VoteDirection)> {
        match self {
            Self::QuestionUpVote => Some((PostKind::Question, VoteDirection::Up)),
            Self::QuestionDownVote => Some((PostKind::Question, VoteDirection::Down)),
            Self::AnswerUpVote => Some((PostKind::Answer, VoteDirection::Up)),
            Self::AnswerDownVote => Some((PostKind::Answer, VoteDirection::Down)),
            _ => None,
        }
    }

    /// Whether `postId` names an answer rather than the path question.
    pub fn targets_answer(&self) -> bool {
        matches!(
            self,
            Self::AcceptAnswer
                | Self::AnswerUpVote
                | Self::AnswerDownVote
                | Self::FlagAnswer
                | Self::RemoveAnswer
        )
    }

    /// Verb used in the anonymous-user message.
    pub fn anonymous_verb(&self) -> &'static str {
        match self {
            Self::AcceptAnswer => "accept or unaccept answers",
            Self::QuestionUpVote
            | Self::QuestionDownVote
            | Self::AnswerUpVote
            | Self::AnswerDownVote => "vote",
            Self::Favorite => "mark favorite questions",
            Self::FlagQuestion | Self::FlagAnswer => "flag posts",
            Self::RemoveQuestion | Self::RemoveAnswer => "delete posts",
            Self::SubscribeQuestion | Self::UnsubscribeQuestion => "subscribe for email updates",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Request mode is not supported. Please try again.")]
pub struct UnsupportedCommand;

impl FromStr for VoteCommand {
    type Err = UnsupportedCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s.trim().parse().map_err(|_| UnsupportedCommand)?;
        Ok(match code {
            0 => Self::AcceptAnswer,
            1 => Self::QuestionUpVote,
            2 => Self::QuestionDownVote,
            4 => Self::Favorite,
            5 => Self::AnswerUpVote,
            6 => Self::AnswerDownVote,
            7 => Self::FlagQuestion,
            8 => Self::FlagAnswer,
            9 => Self::RemoveQuestion,
            10 => Self::RemoveAnswer,
            11 => Self::SubscribeQuestion,
            12 => Self::UnsubscribeQuestion,
            _ => return Err(UnsupportedCommand),
        })
    }
}

pub const NOT_AJAX_MESSAGE: &str = "Sorry, something is not right here...";

/// Response envelope of the vote endpoint. Always sent with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AjaxResponse {
    pub allowed: i32,
    pub success: i32,
    pub status: i32,
    pub count: i32,
    pub message: String,
    /// Error kind when `success` is 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Default for AjaxResponse {
    fn default() -> Self {
        Self {
            allowed: 1,
            success: 1,
            status: 0,
            count: 0,
            message: String::new(),
            code: None,
        }
    }
}

impl AjaxResponse {
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: 0,
            message: message.into(),
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    /// Append a line to the message, separating with `<br/>`.
    pub fn push_message(&mut self, line: &str) {
        if !self.message.is_empty() {
            self.message.push_str("<br/>");
        }
        self.message.push_str(line);
    }
}
