//! Permission predicates over a user's standing.
//!
//! Every predicate returns `Ok(())` or a [`Denial`] whose message is shown to
//! the user verbatim.

use thiserror::Error;

use crate::config::ForumRules;
use crate::user_status::UserStatus;
use crate::vote::VoteDirection;

/// The parts of a user record that permission checks look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub user_id: i32,
    pub reputation: i32,
    pub status: UserStatus,
    pub is_administrator: bool,
}

impl Standing {
    pub fn is_administrator(&self) -> bool {
        self.is_administrator
    }

    /// Moderator status does not count for administrators.
    pub fn is_moderator(&self) -> bool {
        self.status == UserStatus::Moderator && !self.is_administrator
    }

    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended
    }

    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }

    /// Moderators and administrators skip reputation thresholds.
    pub fn is_staff(&self) -> bool {
        self.is_administrator() || self.is_moderator()
    }

    pub fn status_display(&self) -> &'static str {
        if self.is_administrator() {
            "Site Administrator"
        } else {
            self.status.label()
        }
    }
}

/// Action gated by a minimum-reputation threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    VoteUp,
    VoteDown,
    Flag,
    CloseOwnQuestion,
    CloseOthersQuestion,
    ReopenOwnQuestion,
    DeleteOthersPost,
}

impl GatedAction {
    fn threshold(&self, rules: &ForumRules) -> i32 {
        match self {
            Self::VoteUp => rules.min_rep_to_vote_up,
            Self::VoteDown => rules.min_rep_to_vote_down,
            Self::Flag => rules.min_rep_to_flag_offensive,
            Self::CloseOwnQuestion => rules.min_rep_to_close_own_questions,
            Self::CloseOthersQuestion => rules.min_rep_to_close_others_questions,
            Self::ReopenOwnQuestion => rules.min_rep_to_reopen_own_questions,
            Self::DeleteOthersPost => rules.min_rep_to_delete_others_posts,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::VoteUp => "upvote",
            Self::VoteDown => "downvote",
            Self::Flag => "flag offensive posts",
            Self::CloseOwnQuestion => "close own questions",
            Self::CloseOthersQuestion => "close questions asked by others",
            Self::ReopenOwnQuestion => "reopen own questions",
            Self::DeleteOthersPost => "delete posts by others",
        }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Sorry, anonymous users cannot {0}")]
    Anonymous(&'static str),
    #[error(
        "Sorry your account appears to be blocked and you cannot {0} - please contact the site administrator to resolve the issue"
    )]
    Blocked(&'static str),
    #[error(
        "Sorry your account appears to be suspended and you cannot {0} - please contact the site administrator to resolve the issue"
    )]
    Suspended(&'static str),
    #[error(">{required} points required to {verb}")]
    InsufficientReputation { required: i32, verb: &'static str },
    #[error("Sorry, blocked users cannot upload files")]
    BlockedUploader,
    #[error("Sorry, suspended users cannot upload files")]
    SuspendedUploader,
    #[error("uploading images is limited to users with >{0} reputation points")]
    UploadReputation(i32),
    #[error("cannot vote for own posts")]
    OwnPost,
    #[error("Sorry, you cannot accept or unaccept your own answer to your own question")]
    OwnAnswer,
    #[error("Sorry you ran out of votes for today")]
    OutOfVotes,
    #[error("Sorry you ran out of flags for today")]
    OutOfFlags,
    #[error("cannot revoke old vote")]
    VoteTooOld,
    #[error("{0}")]
    Other(String),
}

impl Denial {
    /// Ajax `allowed` code for this denial.
    pub fn allowed_code(&self) -> i32 {
        match self {
            Self::OutOfVotes | Self::OutOfFlags => -3,
            Self::InsufficientReputation { .. } | Self::UploadReputation(_) => -2,
            Self::OwnPost | Self::OwnAnswer => -1,
            Self::Anonymous(_)
            | Self::Blocked(_)
            | Self::Suspended(_)
            | Self::BlockedUploader
            | Self::SuspendedUploader
            | Self::Other(_) => 0,
            // An old vote is reported through `status`, not `allowed`.
            Self::VoteTooOld => 1,
        }
    }
}

fn assert_active(actor: &Standing, verb: &'static str) -> Result<(), Denial> {
    if actor.is_blocked() {
        return Err(Denial::Blocked(verb));
    }
    if actor.is_suspended() {
        return Err(Denial::Suspended(verb));
    }
    Ok(())
}

fn assert_reputation(
    actor: &Standing,
    action: GatedAction,
    rules: &ForumRules,
) -> Result<(), Denial> {
    if actor.is_staff() {
        return Ok(());
    }
    let required = action.threshold(rules);
    if actor.reputation < required {
        return Err(Denial::InsufficientReputation {
            required,
            verb: action.verb(),
        });
    }
    Ok(())
}

/// Voting: active account, reputation threshold per direction, never on own posts.
pub fn assert_can_vote(
    actor: &Standing,
    post_author_id: i32,
    direction: VoteDirection,
    rules: &ForumRules,
) -> Result<(), Denial> {
    assert_active(actor, "vote")?;
    let action = match direction {
        VoteDirection::Up => GatedAction::VoteUp,
        VoteDirection::Down => GatedAction::VoteDown,
    };
    assert_reputation(actor, action, rules)?;
    if actor.user_id == post_author_id {
        return Err(Denial::OwnPost);
    }
    Ok(())
}

pub fn assert_can_flag(actor: &Standing, rules: &ForumRules) -> Result<(), Denial> {
    assert_active(actor, "flag posts")?;
    assert_reputation(actor, GatedAction::Flag, rules)
}

/// Uploads carry their own wording for every refusal.
pub fn assert_can_upload_file(actor: &Standing, rules: &ForumRules) -> Result<(), Denial> {
    if actor.is_suspended() {
        return Err(Denial::SuspendedUploader);
    }
    if actor.is_blocked() {
        return Err(Denial::BlockedUploader);
    }
    if actor.is_staff() {
        return Ok(());
    }
    if actor.reputation < rules.min_rep_to_upload_files {
        return Err(Denial::UploadReputation(rules.min_rep_to_upload_files));
    }
    Ok(())
}

/// Any active user may post content.
pub fn assert_can_post(actor: &Standing) -> Result<(), Denial> {
    assert_active(actor, "post")
}

/// Authors may always edit; staff may edit anything.
pub fn assert_can_edit_post(actor: &Standing, post_author_id: i32) -> Result<(), Denial> {
    assert_active(actor, "edit posts")?;
    if actor.user_id == post_author_id || actor.is_staff() {
        return Ok(());
    }
    Err(Denial::Other("Sorry, only the author or a moderator can edit this post".into()))
}

/// Authors may delete their own posts; others need staff rights or reputation.
pub fn assert_can_delete_post(
    actor: &Standing,
    post_author_id: i32,
    rules: &ForumRules,
) -> Result<(), Denial> {
    assert_active(actor, "delete posts")?;
    if actor.user_id == post_author_id {
        return Ok(());
    }
    assert_reputation(actor, GatedAction::DeleteOthersPost, rules)
}

/// Comments can only be removed by their author or staff.
pub fn assert_can_delete_comment(actor: &Standing, comment_author_id: i32) -> Result<(), Denial> {
    assert_active(actor, "delete comments")?;
    if actor.user_id == comment_author_id || actor.is_staff() {
        return Ok(());
    }
    Err(Denial::Other("Sorry, only the author or a moderator can delete this comment".into()))
}

pub fn assert_can_close_question(
    actor: &Standing,
    question_author_id: i32,
    rules: &ForumRules,
) -> Result<(), Denial> {
    assert_active(actor, "close questions")?;
    let action = if actor.user_id == question_author_id {
        GatedAction::CloseOwnQuestion
    } else {
        GatedAction::CloseOthersQuestion
    };
    assert_reputation(actor, action, rules)
}

/// Only staff may reopen questions asked by others.
pub fn assert_can_reopen_question(
    actor: &Standing,
    question_author_id: i32,
    rules: &ForumRules,
) -> Result<(), Denial> {
    assert_active(actor, "reopen questions")?;
    if actor.is_staff() {
        return Ok(());
    }
    if actor.user_id != question_author_id {
        return Err(Denial::Other(
            "Sorry, only moderators can reopen questions asked by others".into(),
        ));
    }
    assert_reputation(actor, GatedAction::ReopenOwnQuestion, rules)
}

/// Only the question's author may accept, and never an answer they wrote.
pub fn assert_can_accept_answer(
    actor: &Standing,
    question_author_id: i32,
    answer_author_id: i32,
) -> Result<(), Denial> {
    assert_active(actor, "accept or unaccept answers")?;
    if actor.user_id != question_author_id {
        return Err(Denial::Other(
            "Sorry, only question owners can accept or unaccept answers".into(),
        ));
    }
    if actor.user_id == answer_author_id {
        return Err(Denial::OwnAnswer);
    }
    Ok(())
}

/// Administrators moderate anyone; moderators moderate regular users only.
pub fn can_moderate_user(actor: &Standing, other: &Standing) -> bool {
    if actor.is_administrator() {
        true
    } else if actor.is_moderator() {
        !(other.is_moderator() || other.is_administrator())
    } else {
        false
    }
}

pub fn assert_can_moderate_user(actor: &Standing, other: &Standing) -> Result<(), Denial> {
    if can_moderate_user(actor, other) {
        Ok(())
    } else {
        Err(Denial::Other("Sorry, you cannot moderate this user".into()))
    }
}
