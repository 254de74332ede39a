//! Vote state machine.
//!
//! Per (user, post) pair a vote is absent, up or down. [`plan_vote`] decides
//! the transition for a requested direction; persisting it is the server's job.

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ForumRules;
use crate::permission::Denial;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")
)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "up"))]
    Up,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "down"))]
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vote already stored for the (user, post) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingVote {
    pub direction: VoteDirection,
    pub voted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No previous vote; a new row is inserted.
    Cast(VoteDirection),
    /// The existing row changes direction.
    Flip {
        from: VoteDirection,
        to: VoteDirection,
    },
    /// The existing row is removed.
    Cancel(VoteDirection),
}

/// Change applied to a post's vote counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreChange {
    pub score: i32,
    pub up: i32,
    pub down: i32,
}

impl VoteTransition {
    pub fn score_change(&self) -> ScoreChange {
        match *self {
            Self::Cast(VoteDirection::Up) => ScoreChange { score: 1, up: 1, down: 0 },
            Self::Cast(VoteDirection::Down) => ScoreChange { score: -1, up: 0, down: 1 },
            Self::Cancel(VoteDirection::Up) => ScoreChange { score: -1, up: -1, down: 0 },
            Self::Cancel(VoteDirection::Down) => ScoreChange { score: 1, up: 0, down: -1 },
            Self::Flip { to: VoteDirection::Up, .. } => ScoreChange { score: 2, up: 1, down: -1 },
            Self::Flip { to: VoteDirection::Down, .. } => ScoreChange { score: -2, up: -1, down: 1 },
        }
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel(_))
    }

    /// Elementary steps; a flip cancels the old direction, then casts the new one.
    pub fn steps(&self) -> Vec<VoteStep> {
        match *self {
            Self::Cast(d) => vec![VoteStep::Cast(d)],
            Self::Cancel(d) => vec![VoteStep::Cancel(d)],
            Self::Flip { from, to } => vec![VoteStep::Cancel(from), VoteStep::Cast(to)],
        }
    }
}

/// One side effect unit of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStep {
    Cast(VoteDirection),
    Cancel(VoteDirection),
}

/// Outcome of [`plan_vote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotePlan {
    pub transition: VoteTransition,
    /// Votes remaining today after a new vote; `None` for flips and cancels.
    pub votes_left: Option<u32>,
}

/// Whole calendar days (UTC) between `earlier` and `now`.
///
/// A vote cast at 23:59 and checked at 00:01 the next day is one day old.
pub fn calendar_days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now.date_naive() - earlier.date_naive()).num_days()
}

/// Whether a vote cast at `voted_at` may still be canceled or flipped.
pub fn can_revoke(voted_at: DateTime<Utc>, now: DateTime<Utc>, rules: &ForumRules) -> bool {
    calendar_days_between(voted_at, now) < rules.max_days_to_cancel_vote
}

/// `[start, end)` of the UTC calendar day containing `now`.
pub fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Votes still available today given how many were cast.
pub fn unused_votes(votes_cast_today: u64, rules: &ForumRules) -> u32 {
    let max = u64::from(rules.max_votes_per_user_per_day);
    max.saturating_sub(votes_cast_today) as u32
}

/// Decide what a vote request does.
///
/// Same direction as the stored vote cancels it, the opposite direction
/// flips it, and no stored vote casts a new one against the daily quota.
pub fn plan_vote(
    existing: Option<ExistingVote>,
    requested: VoteDirection,
    now: DateTime<Utc>,
    votes_cast_today: u64,
    rules: &ForumRules,
) -> Result<VotePlan, Denial> {
    match existing {
        Some(vote) => {
            if !can_revoke(vote.voted_at, now, rules) {
                return Err(Denial::VoteTooOld);
            }
            let transition = if vote.direction == requested {
                VoteTransition::Cancel(vote.direction)
            } else {
                VoteTransition::Flip {
                    from: vote.direction,
                    to: requested,
                }
            };
            Ok(VotePlan {
                transition,
                votes_left: None,
            })
        }
        None => {
            let available = unused_votes(votes_cast_today, rules);
            if available == 0 {
                return Err(Denial::OutOfVotes);
            }
            Ok(VotePlan {
                transition: VoteTransition::Cast(requested),
                votes_left: Some(available - 1),
            })
        }
    }
}

/// Warning shown when the user is running low on votes.
pub fn votes_left_message(votes_left: u32, rules: &ForumRules) -> Option<String> {
    (votes_left <= rules.votes_left_warning_threshold)
        .then(|| format!("You have {votes_left} votes left for today"))
}
