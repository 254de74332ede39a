use chrono::{DateTime, Utc};
use common::permission::{
    assert_can_close_question, assert_can_delete_post, assert_can_moderate_user,
    assert_can_reopen_question,
};
use common::reputation::ReputationChange;
use common::{ActivityType, CloseReason, ForumRules, PostKind, ReputeReason, UserStatus};
use sea_orm::*;

use crate::entity::{question, user};
use crate::error::AppError;
use crate::services::activity::{ActivityService, NewActivity};
use crate::services::post::{Post, find_user, lock_question};
use crate::services::reputation::{Adjustment, ReputationService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Restored,
}

pub struct ModerationService<'a, C: ConnectionTrait> {
    conn: &'a C,
    rules: &'a ForumRules,
}

impl<'a, C: ConnectionTrait> ModerationService<'a, C> {
    pub fn new(conn: &'a C, rules: &'a ForumRules) -> Self {
        Self { conn, rules }
    }

    /// Soft delete a live post, or restore a deleted one.
    pub async fn toggle_delete(
        &self,
        actor_id: i32,
        kind: PostKind,
        post_id: i32,
        now: DateTime<Utc>,
    ) -> Result<DeleteOutcome, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let post = Post::lock(self.conn, kind, post_id).await?;

        assert_can_delete_post(&actor.standing(), post.author_id(), self.rules)?;

        let restoring = post.deleted();
        let question_id = post.question_id();
        let author_id = post.author_id();
        post.set_deleted(self.conn, !restoring, actor_id, now).await?;

        if restoring {
            tracing::info!(actor_id, post_kind = %kind, post_id, "post restored");
            return Ok(DeleteOutcome::Restored);
        }

        let activity_type = match kind {
            PostKind::Question => ActivityType::DeleteQuestion,
            PostKind::Answer => ActivityType::DeleteAnswer,
        };
        ActivityService::new(self.conn)
            .record(
                NewActivity {
                    actor_id,
                    activity_type,
                    target_kind: kind.into(),
                    target_id: post_id,
                    question_id: Some(question_id),
                    receivers: vec![author_id],
                },
                now,
            )
            .await?;

        tracing::info!(actor_id, post_kind = %kind, post_id, "post deleted");
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn close(
        &self,
        actor_id: i32,
        question_id: i32,
        reason: CloseReason,
        now: DateTime<Utc>,
    ) -> Result<question::Model, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let question = lock_question(self.conn, question_id).await?;
        if question.deleted {
            return Err(AppError::NotFound("Question not found".into()));
        }
        assert_can_close_question(&actor.standing(), question.author_id, self.rules)?;
        if question.closed {
            return Err(AppError::Conflict("Question is already closed".into()));
        }

        let mut am: question::ActiveModel = question.into();
        am.closed = Set(true);
        am.closed_by = Set(Some(actor_id));
        am.closed_at = Set(Some(now));
        am.close_reason = Set(Some(reason));
        let question = am.update(self.conn).await?;

        tracing::info!(actor_id, question_id, ?reason, "question closed");
        Ok(question)
    }

    pub async fn reopen(
        &self,
        actor_id: i32,
        question_id: i32,
    ) -> Result<question::Model, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let question = lock_question(self.conn, question_id).await?;
        if question.deleted {
            return Err(AppError::NotFound("Question not found".into()));
        }
        assert_can_reopen_question(&actor.standing(), question.author_id, self.rules)?;
        if !question.closed {
            return Err(AppError::Conflict("Question is not closed".into()));
        }

        let mut am: question::ActiveModel = question.into();
        am.closed = Set(false);
        am.closed_by = Set(None);
        am.closed_at = Set(None);
        am.close_reason = Set(None);
        let question = am.update(self.conn).await?;

        tracing::info!(actor_id, question_id, "question reopened");
        Ok(question)
    }

    /// Change another user's status.
    ///
    /// Giving an administrator any status revokes administrator rights.
    pub async fn set_user_status(
        &self,
        actor_id: i32,
        target_id: i32,
        status: UserStatus,
    ) -> Result<user::Model, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let target = find_user(self.conn, target_id).await?;
        assert_can_moderate_user(&actor.standing(), &target.standing())?;

        if target.status == status && !target.is_administrator {
            return Ok(target);
        }

        let previous = target.status;
        let mut am: user::ActiveModel = target.into();
        am.status = Set(status);
        am.is_administrator = Set(false);
        let target = am.update(self.conn).await?;

        tracing::info!(actor_id, target_id, %previous, %status, "user status changed");
        Ok(target)
    }

    /// Manual reputation adjustment. A zero delta changes nothing.
    pub async fn moderate_reputation(
        &self,
        actor_id: i32,
        target_id: i32,
        delta: i32,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<ReputationChange, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let target = find_user(self.conn, target_id).await?;
        assert_can_moderate_user(&actor.standing(), &target.standing())?;

        let comment = comment.trim();
        if comment.is_empty() {
            return Err(AppError::Validation(
                "A comment is required to change reputation".into(),
            ));
        }
        if delta == 0 {
            return Ok(ReputationChange {
                reputation: target.reputation,
                applied: 0,
            });
        }

        let mut adjustment = Adjustment::new(target_id, delta, ReputeReason::Moderation, None);
        adjustment.comment = Some(comment.to_string());
        let change = ReputationService::new(self.conn, self.rules.max_rep_gain_per_user_per_day)
            .adjust(adjustment, now)
            .await?;

        tracing::info!(actor_id, target_id, delta, applied = change.applied, "reputation moderated");
        Ok(change)
    }
}
