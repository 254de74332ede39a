use chrono::{DateTime, Utc};
use common::permission::assert_can_vote;
use common::vote::{
    ExistingVote, VoteStep, VoteTransition, plan_vote, utc_day_bounds, votes_left_message,
};
use common::{ActivityType, ForumRules, PostKind, ReputeReason, TargetKind, VoteDirection};
use sea_orm::*;

use crate::entity::vote;
use crate::error::AppError;
use crate::services::activity::{ActivityService, NewActivity};
use crate::services::post::{Post, find_user};
use crate::services::reputation::{Adjustment, ReputationService};

#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub transition: VoteTransition,
    /// Post score after the vote.
    pub score: i32,
    /// Low-quota warning, if any.
    pub message: Option<String>,
}

pub struct VoteService<'a, C: ConnectionTrait> {
    conn: &'a C,
    rules: &'a ForumRules,
}

impl<'a, C: ConnectionTrait> VoteService<'a, C> {
    pub fn new(conn: &'a C, rules: &'a ForumRules) -> Self {
        Self { conn, rules }
    }

    /// Cast, flip or cancel `voter_id`'s vote on a post.
    ///
    /// Must run inside a transaction; the post row stays locked until commit.
    pub async fn process_vote(
        &self,
        voter_id: i32,
        kind: PostKind,
        post_id: i32,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome, AppError> {
        let voter = find_user(self.conn, voter_id).await?;
        let post = Post::lock_live(self.conn, kind, post_id).await?;

        assert_can_vote(&voter.standing(), post.author_id(), direction, self.rules)?;

        let existing = vote::Entity::find()
            .filter(vote::Column::UserId.eq(voter_id))
            .filter(vote::Column::PostKind.eq(kind))
            .filter(vote::Column::PostId.eq(post_id))
            .one(self.conn)
            .await?;

        let cast_today = if existing.is_none() {
            let (start, end) = utc_day_bounds(now);
            vote::Entity::find()
                .filter(vote::Column::UserId.eq(voter_id))
                .filter(vote::Column::VotedAt.gte(start))
                .filter(vote::Column::VotedAt.lt(end))
                .count(self.conn)
                .await?
        } else {
            0
        };

        let plan = plan_vote(
            existing.as_ref().map(|v| ExistingVote {
                direction: v.direction,
                voted_at: v.voted_at,
            }),
            direction,
            now,
            cast_today,
            self.rules,
        )?;

        let vote_id = match (plan.transition, existing) {
            (VoteTransition::Cast(dir), _) => {
                let inserted = vote::ActiveModel {
                    user_id: Set(voter_id),
                    post_kind: Set(kind),
                    post_id: Set(post_id),
                    direction: Set(dir),
                    voted_at: Set(now),
                    ..Default::default()
                }
                .insert(self.conn)
                .await
                .map_err(|e| match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        AppError::Conflict("Vote already recorded".into())
                    }
                    _ => AppError::from(e),
                })?;
                inserted.id
            }
            (VoteTransition::Flip { to, .. }, Some(row)) => {
                let id = row.id;
                let mut am: vote::ActiveModel = row.into();
                am.direction = Set(to);
                am.update(self.conn).await?;
                id
            }
            (VoteTransition::Cancel(_), Some(row)) => {
                let id = row.id;
                vote::Entity::delete_by_id(id).exec(self.conn).await?;
                id
            }
            (_, None) => {
                return Err(AppError::Internal(
                    "vote flip or cancel without a stored vote".into(),
                ));
            }
        };

        let post = post
            .apply_score(self.conn, plan.transition.score_change())
            .await?;

        let question_id = Some(post.question_id());
        let author_id = post.author_id();
        let author_gets_reputation = !post.wiki();
        let r = self.rules;
        let mut adjustments = Vec::new();
        for step in plan.transition.steps() {
            let (author, voter_delta) = match step {
                VoteStep::Cast(VoteDirection::Up) => (
                    (r.rep_gain_for_receiving_upvote, ReputeReason::GainByUpvoted),
                    None,
                ),
                VoteStep::Cancel(VoteDirection::Up) => (
                    (
                        r.rep_loss_for_receiving_upvote_cancel,
                        ReputeReason::LoseByUpvoteCanceled,
                    ),
                    None,
                ),
                VoteStep::Cast(VoteDirection::Down) => (
                    (r.rep_loss_for_receiving_downvote, ReputeReason::LoseByDownvoted),
                    Some((r.rep_loss_for_downvoting, ReputeReason::LoseByDownvoting)),
                ),
                VoteStep::Cancel(VoteDirection::Down) => (
                    (
                        r.rep_gain_for_receiving_downvote_cancel,
                        ReputeReason::GainByDownvoteCanceled,
                    ),
                    Some((
                        r.rep_gain_for_canceling_downvote,
                        ReputeReason::GainByCancelingDownvote,
                    )),
                ),
            };
            if author_gets_reputation {
                adjustments.push(Adjustment::new(author_id, author.0, author.1, question_id));
            }
            if let Some((delta, reason)) = voter_delta {
                adjustments.push(Adjustment::new(voter_id, delta, reason, question_id));
            }
        }
        ReputationService::new(self.conn, r.max_rep_gain_per_user_per_day)
            .adjust_all(adjustments, now)
            .await?;

        let activities = ActivityService::new(self.conn);
        for step in plan.transition.steps() {
            let activity_type = match step {
                VoteStep::Cast(VoteDirection::Up) => ActivityType::VoteUp,
                VoteStep::Cast(VoteDirection::Down) => ActivityType::VoteDown,
                VoteStep::Cancel(_) => ActivityType::CancelVote,
            };
            activities
                .record(
                    NewActivity {
                        actor_id: voter_id,
                        activity_type,
                        target_kind: TargetKind::Vote,
                        target_id: vote_id,
                        question_id,
                        receivers: Vec::new(),
                    },
                    now,
                )
                .await?;
        }

        tracing::info!(
            voter_id,
            post_kind = %kind,
            post_id,
            transition = ?plan.transition,
            score = post.score(),
            "vote processed"
        );

        Ok(VoteOutcome {
            transition: plan.transition,
            score: post.score(),
            message: plan
                .votes_left
                .and_then(|left| votes_left_message(left, self.rules)),
        })
    }
}
