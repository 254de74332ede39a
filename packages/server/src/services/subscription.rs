//! Question following and email feed settings.

use chrono::{DateTime, Utc};
use common::permission::assert_can_post;
use common::{EmailFrequency, FeedType, ForumRules};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entity::{email_feed_setting, question, question_follower};
use crate::error::AppError;
use crate::services::post::find_user;

pub const EMAIL_NEEDS_VALIDATION: &str =
    "Your subscription is saved, but email address needs to be validated";
pub const FREQUENCY_SET_TO_DAILY: &str = "email update frequency has been set to daily";

pub struct SubscriptionService<'a, C: ConnectionTrait> {
    conn: &'a C,
    rules: &'a ForumRules,
}

impl<'a, C: ConnectionTrait> SubscriptionService<'a, C> {
    pub fn new(conn: &'a C, rules: &'a ForumRules) -> Self {
        Self { conn, rules }
    }

    /// Give a new account one setting per feed type at its default frequency.
    pub async fn create_default_settings(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        email_feed_setting::Entity::insert_many(FeedType::ALL.iter().map(|feed| {
            email_feed_setting::ActiveModel {
                subscriber_id: Set(user_id),
                feed_type: Set(*feed),
                frequency: Set(feed.default_frequency()),
                added_at: Set(now),
                reported_at: Set(None),
                ..Default::default()
            }
        }))
        .exec_without_returning(self.conn)
        .await?;
        Ok(())
    }

    /// Start following a question if not already following it.
    ///
    /// Returns whether a new follow was stored.
    pub async fn follow(
        &self,
        user_id: i32,
        question_id: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = question_follower::Entity::insert(question_follower::ActiveModel {
            question_id: Set(question_id),
            user_id: Set(user_id),
            followed_at: Set(now),
        })
        .on_conflict(
            OnConflict::columns([
                question_follower::Column::QuestionId,
                question_follower::Column::UserId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await;
        match result {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Follow a question for email updates.
    ///
    /// Returns the notices to show: a validation reminder on a new follow,
    /// and a note when the followed-questions feed had to be switched on.
    pub async fn subscribe(
        &self,
        user_id: i32,
        question_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError> {
        let user = find_user(self.conn, user_id).await?;
        assert_can_post(&user.standing())?;
        ensure_question(self.conn, question_id).await?;

        let followed = self.follow(user_id, question_id, now).await?;

        let mut messages = Vec::new();
        if followed && self.rules.email_validation && !user.email_isvalid {
            messages.push(EMAIL_NEEDS_VALIDATION.to_string());
        }

        let setting = email_feed_setting::Entity::find()
            .filter(email_feed_setting::Column::SubscriberId.eq(user_id))
            .filter(email_feed_setting::Column::FeedType.eq(FeedType::SelectedQuestions))
            .one(self.conn)
            .await?;
        match setting {
            Some(s) if s.frequency == EmailFrequency::Never => {
                let mut am: email_feed_setting::ActiveModel = s.into();
                am.frequency = Set(EmailFrequency::Daily);
                am.update(self.conn).await?;
                messages.push(FREQUENCY_SET_TO_DAILY.to_string());
            }
            Some(_) => {}
            None => {
                email_feed_setting::ActiveModel {
                    subscriber_id: Set(user_id),
                    feed_type: Set(FeedType::SelectedQuestions),
                    frequency: Set(EmailFrequency::Daily),
                    added_at: Set(now),
                    reported_at: Set(None),
                    ..Default::default()
                }
                .insert(self.conn)
                .await?;
                messages.push(FREQUENCY_SET_TO_DAILY.to_string());
            }
        }

        tracing::info!(user_id, question_id, "question followed");
        Ok(messages)
    }

    pub async fn unsubscribe(&self, user_id: i32, question_id: i32) -> Result<(), AppError> {
        let user = find_user(self.conn, user_id).await?;
        assert_can_post(&user.standing())?;
        ensure_question(self.conn, question_id).await?;

        question_follower::Entity::delete_many()
            .filter(question_follower::Column::QuestionId.eq(question_id))
            .filter(question_follower::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await?;

        tracing::info!(user_id, question_id, "question unfollowed");
        Ok(())
    }
}

async fn ensure_question<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), AppError> {
    match question::Entity::find_by_id(id).one(conn).await? {
        Some(q) if !q.deleted => Ok(()),
        _ => Err(AppError::NotFound("Question not found".into())),
    }
}
