use chrono::{DateTime, Utc};
use common::permission::assert_can_post;
use common::{ActivityType, TargetKind};
use sea_orm::*;

use crate::entity::{favorite_question, question};
use crate::error::AppError;
use crate::services::activity::{ActivityService, NewActivity};
use crate::services::post::{find_user, lock_question};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteOutcome {
    /// `false` when the favorite was removed.
    pub added: bool,
    pub count: i32,
}

pub struct FavoriteService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FavoriteService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn toggle(
        &self,
        user_id: i32,
        question_id: i32,
        now: DateTime<Utc>,
    ) -> Result<FavoriteOutcome, AppError> {
        let actor = find_user(self.conn, user_id).await?;
        assert_can_post(&actor.standing())?;
        let question = lock_question(self.conn, question_id).await?;
        if question.deleted {
            return Err(AppError::NotFound("Question not found".into()));
        }

        let existing = favorite_question::Entity::find_by_id((question_id, user_id))
            .one(self.conn)
            .await?;
        let author_id = question.author_id;
        let added = existing.is_none();

        match existing {
            Some(row) => {
                row.delete(self.conn).await?;
            }
            None => {
                favorite_question::ActiveModel {
                    question_id: Set(question_id),
                    user_id: Set(user_id),
                    added_at: Set(now),
                }
                .insert(self.conn)
                .await?;
            }
        }

        let count = std::cmp::Ord::max(question.favourite_count + if added { 1 } else { -1 }, 0);
        let mut am: question::ActiveModel = question.into();
        am.favourite_count = Set(count);
        am.update(self.conn).await?;

        if added {
            ActivityService::new(self.conn)
                .record(
                    NewActivity {
                        actor_id: user_id,
                        activity_type: ActivityType::Favorite,
                        target_kind: TargetKind::FavoriteQuestion,
                        target_id: question_id,
                        question_id: Some(question_id),
                        receivers: vec![author_id],
                    },
                    now,
                )
                .await?;
        }

        tracing::info!(user_id, question_id, added, count, "favorite toggled");
        Ok(FavoriteOutcome { added, count })
    }
}
