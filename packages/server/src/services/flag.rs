use chrono::{DateTime, Utc};
use common::permission::{Denial, assert_can_flag};
use common::vote::utc_day_bounds;
use common::{ActivityType, ForumRules, PostKind, ReputeReason};
use sea_orm::*;

use crate::entity::flagged_item;
use crate::error::AppError;
use crate::services::activity::{ActivityService, NewActivity};
use crate::services::post::{Post, find_user};
use crate::services::reputation::{Adjustment, ReputationService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    /// The user had already flagged this post; nothing changed.
    AlreadyFlagged,
    Flagged { count: i32 },
}

pub struct FlagService<'a, C: ConnectionTrait> {
    conn: &'a C,
    rules: &'a ForumRules,
}

impl<'a, C: ConnectionTrait> FlagService<'a, C> {
    pub fn new(conn: &'a C, rules: &'a ForumRules) -> Self {
        Self { conn, rules }
    }

    /// Flag a post as offensive.
    ///
    /// Each flag costs the author reputation; reaching the hide and delete
    /// thresholds costs more, and the delete threshold soft-deletes the post.
    pub async fn flag(
        &self,
        actor_id: i32,
        kind: PostKind,
        post_id: i32,
        now: DateTime<Utc>,
    ) -> Result<FlagOutcome, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let post = Post::lock_live(self.conn, kind, post_id).await?;

        let (start, end) = utc_day_bounds(now);
        let flagged_today = flagged_item::Entity::find()
            .filter(flagged_item::Column::UserId.eq(actor_id))
            .filter(flagged_item::Column::FlaggedAt.gte(start))
            .filter(flagged_item::Column::FlaggedAt.lt(end))
            .count(self.conn)
            .await?;
        if flagged_today >= u64::from(self.rules.max_flags_per_user_per_day) {
            return Err(Denial::OutOfFlags.into());
        }

        assert_can_flag(&actor.standing(), self.rules)?;

        let existing = flagged_item::Entity::find()
            .filter(flagged_item::Column::UserId.eq(actor_id))
            .filter(flagged_item::Column::PostKind.eq(kind))
            .filter(flagged_item::Column::PostId.eq(post_id))
            .one(self.conn)
            .await?;
        if existing.is_some() {
            return Ok(FlagOutcome::AlreadyFlagged);
        }

        flagged_item::ActiveModel {
            user_id: Set(actor_id),
            post_kind: Set(kind),
            post_id: Set(post_id),
            flagged_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Post already flagged".into())
            }
            _ => AppError::from(e),
        })?;

        let count = post.offensive_flag_count() + 1;
        let author_id = post.author_id();
        let question_id = Some(post.question_id());
        let post = post.set_flag_count(self.conn, count).await?;

        let mut adjustments = vec![Adjustment::new(
            author_id,
            self.rules.rep_loss_for_receiving_flag,
            ReputeReason::LoseByFlagged,
            question_id,
        )];
        if count == self.rules.min_flags_to_hide_post {
            adjustments.push(Adjustment::new(
                author_id,
                self.rules.rep_loss_for_receiving_hide_flags,
                ReputeReason::LoseByFlaggedHide,
                question_id,
            ));
        }
        let reached_delete = count == self.rules.min_flags_to_delete_post;
        if reached_delete {
            adjustments.push(Adjustment::new(
                author_id,
                self.rules.rep_loss_for_receiving_delete_flags,
                ReputeReason::LoseByFlaggedDelete,
                question_id,
            ));
        }
        ReputationService::new(self.conn, self.rules.max_rep_gain_per_user_per_day)
            .adjust_all(adjustments, now)
            .await?;

        if reached_delete {
            post.set_deleted(self.conn, true, actor_id, now).await?;
            tracing::info!(post_kind = %kind, post_id, "post deleted by flags");
        }

        ActivityService::new(self.conn)
            .record(
                NewActivity {
                    actor_id,
                    activity_type: ActivityType::MarkOffensive,
                    target_kind: kind.into(),
                    target_id: post_id,
                    question_id,
                    receivers: vec![author_id],
                },
                now,
            )
            .await?;

        Ok(FlagOutcome::Flagged { count })
    }
}

