use chrono::{DateTime, Utc};
use common::permission::assert_can_accept_answer;
use common::{ActivityType, ForumRules, ReputeReason, TargetKind};
use sea_orm::*;

use crate::entity::answer;
use crate::error::AppError;
use crate::services::activity::{ActivityService, NewActivity};
use crate::services::post::{find_user, lock_answer, lock_question};
use crate::services::reputation::{Adjustment, ReputationService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    Unaccepted,
}

pub struct AcceptService<'a, C: ConnectionTrait> {
    conn: &'a C,
    rules: &'a ForumRules,
}

impl<'a, C: ConnectionTrait> AcceptService<'a, C> {
    pub fn new(conn: &'a C, rules: &'a ForumRules) -> Self {
        Self { conn, rules }
    }

    fn reputation(&self) -> ReputationService<'a, C> {
        ReputationService::new(self.conn, self.rules.max_rep_gain_per_user_per_day)
    }

    /// Accept an answer, or un-accept it when it is already accepted.
    ///
    /// Accepting un-accepts any other accepted answer of the same question
    /// first, so a question has at most one accepted answer.
    pub async fn toggle(
        &self,
        actor_id: i32,
        answer_id: i32,
        now: DateTime<Utc>,
    ) -> Result<AcceptOutcome, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let unlocked = answer::Entity::find_by_id(answer_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Answer not found".into()))?;

        // Question first: concurrent accepts on one question serialize here.
        let question = lock_question(self.conn, unlocked.question_id).await?;
        let target = lock_answer(self.conn, answer_id).await?;
        if target.deleted || question.deleted {
            return Err(AppError::NotFound("Answer not found".into()));
        }

        assert_can_accept_answer(&actor.standing(), question.author_id, target.author_id)?;

        if target.accepted {
            self.unaccept(target, question.author_id, now).await?;
            return Ok(AcceptOutcome::Unaccepted);
        }

        let previous = answer::Entity::find()
            .filter(answer::Column::QuestionId.eq(question.id))
            .filter(answer::Column::Accepted.eq(true))
            .filter(answer::Column::Id.ne(answer_id))
            .all(self.conn)
            .await?;
        for other in previous {
            self.unaccept(other, question.author_id, now).await?;
        }

        let answer_author = target.author_id;
        let question_id = target.question_id;
        let mut am: answer::ActiveModel = target.into();
        am.accepted = Set(true);
        am.accepted_at = Set(Some(now));
        am.update(self.conn).await?;

        self.reputation()
            .adjust_all(
                vec![
                    Adjustment::new(
                        answer_author,
                        self.rules.rep_gain_for_receiving_answer_acceptance,
                        ReputeReason::GainByAnswerAccepted,
                        Some(question_id),
                    ),
                    Adjustment::new(
                        question.author_id,
                        self.rules.rep_gain_for_accepting_answer,
                        ReputeReason::GainByAcceptingAnswer,
                        Some(question_id),
                    ),
                ],
                now,
            )
            .await?;

        ActivityService::new(self.conn)
            .record(
                NewActivity {
                    actor_id,
                    activity_type: ActivityType::MarkAnswer,
                    target_kind: TargetKind::Answer,
                    target_id: answer_id,
                    question_id: Some(question_id),
                    receivers: vec![answer_author],
                },
                now,
            )
            .await?;

        tracing::info!(answer_id, question_id, "answer accepted");
        Ok(AcceptOutcome::Accepted)
    }

    async fn unaccept(
        &self,
        answer: answer::Model,
        question_author_id: i32,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let answer_author = answer.author_id;
        let question_id = answer.question_id;
        let answer_id = answer.id;
        let mut am: answer::ActiveModel = answer.into();
        am.accepted = Set(false);
        am.accepted_at = Set(None);
        am.update(self.conn).await?;

        self.reputation()
            .adjust_all(
                vec![
                    Adjustment::new(
                        answer_author,
                        self.rules.rep_loss_for_receiving_acceptance_cancel,
                        ReputeReason::LoseByAcceptedAnswerCanceled,
                        Some(question_id),
                    ),
                    Adjustment::new(
                        question_author_id,
                        self.rules.rep_loss_for_canceling_acceptance,
                        ReputeReason::LoseByCancelingAcceptedAnswer,
                        Some(question_id),
                    ),
                ],
                now,
            )
            .await?;

        tracing::info!(answer_id, question_id, "answer unaccepted");
        Ok(())
    }
}
