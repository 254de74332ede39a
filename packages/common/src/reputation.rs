#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest reputation a user can have.
pub const REPUTATION_FLOOR: i32 = 1;

/// Why a reputation ledger row was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")
)]
#[serde(rename_all = "snake_case")]
pub enum ReputeReason {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "gain_by_upvoted"))]
    GainByUpvoted,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "gain_by_answer_accepted"))]
    GainByAnswerAccepted,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "gain_by_accepting_answer"))]
    GainByAcceptingAnswer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "gain_by_downvote_canceled"))]
    GainByDownvoteCanceled,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "gain_by_canceling_downvote"))]
    GainByCancelingDownvote,
    #[cfg_attr(
        feature = "sea-orm",
        sea_orm(string_value = "lose_by_canceling_accepted_answer")
    )]
    LoseByCancelingAcceptedAnswer,
    #[cfg_attr(
        feature = "sea-orm",
        sea_orm(string_value = "lose_by_accepted_answer_canceled")
    )]
    LoseByAcceptedAnswerCanceled,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lose_by_downvoted"))]
    LoseByDownvoted,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lose_by_flagged"))]
    LoseByFlagged,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lose_by_downvoting"))]
    LoseByDownvoting,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lose_by_flagged_hide"))]
    LoseByFlaggedHide,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lose_by_flagged_delete"))]
    LoseByFlaggedDelete,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lose_by_upvote_canceled"))]
    LoseByUpvoteCanceled,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "moderation"))]
    Moderation,
}

impl ReputeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GainByUpvoted => "gain_by_upvoted",
            Self::GainByAnswerAccepted => "gain_by_answer_accepted",
            Self::GainByAcceptingAnswer => "gain_by_accepting_answer",
            Self::GainByDownvoteCanceled => "gain_by_downvote_canceled",
            Self::GainByCancelingDownvote => "gain_by_canceling_downvote",
            Self::LoseByCancelingAcceptedAnswer => "lose_by_canceling_accepted_answer",
            Self::LoseByAcceptedAnswerCanceled => "lose_by_accepted_answer_canceled",
            Self::LoseByDownvoted => "lose_by_downvoted",
            Self::LoseByFlagged => "lose_by_flagged",
            Self::LoseByDownvoting => "lose_by_downvoting",
            Self::LoseByFlaggedHide => "lose_by_flagged_hide",
            Self::LoseByFlaggedDelete => "lose_by_flagged_delete",
            Self::LoseByUpvoteCanceled => "lose_by_upvote_canceled",
            Self::Moderation => "moderation",
        }
    }

    /// Gains subject to the daily cap.
    pub fn is_capped(&self) -> bool {
        matches!(self, Self::GainByUpvoted)
    }
}

impl fmt::Display for ReputeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of applying a reputation delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationChange {
    pub reputation: i32,
    /// Delta actually applied after the floor.
    pub applied: i32,
}

impl ReputationChange {
    /// Split the applied delta into ledger `(positive, negative)` magnitudes.
    pub fn ledger_split(&self) -> (i32, i32) {
        if self.applied < 0 {
            (0, -self.applied)
        } else {
            (self.applied, 0)
        }
    }
}

/// Apply `delta` to `current`, never going below [`REPUTATION_FLOOR`].
pub fn apply_delta(current: i32, delta: i32) -> ReputationChange {
    let target = current.saturating_add(delta);
    let reputation = target.max(REPUTATION_FLOOR);
    ReputationChange {
        reputation,
        applied: reputation - current,
    }
}

/// Clamp a capped gain so the day's total does not exceed `cap`.
pub fn capped_gain(delta: i32, gained_today: i32, cap: i32) -> i32 {
    if delta <= 0 {
        return delta;
    }
    delta.min((cap - gained_today).max(0))
}
