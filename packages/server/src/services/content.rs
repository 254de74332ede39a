//! Posting, editing and reading questions, answers and comments.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::counter::decrement_response_count;
use common::permission::{assert_can_delete_comment, assert_can_edit_post, assert_can_post};
use common::{ActivityType, ForumRules, PostKind, TargetKind};
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::*;

use crate::entity::{
    activity, activity_recipient, answer, comment, question, question_view, user,
};
use crate::error::AppError;
use crate::services::activity::{ActivityService, NewActivity, PostUpdate};
use crate::services::notify::OutgoingEmail;
use crate::services::post::{Post, find_user, lock_answer, lock_question};
use crate::services::subscription::SubscriptionService;
use crate::services::tag::TagService;

/// Validated input for a new question.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub wiki: bool,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A written row plus the instant emails to send once the transaction commits.
#[derive(Debug)]
pub struct Posted<T> {
    pub model: T,
    pub emails: Vec<OutgoingEmail>,
}

/// A question with its live answers and all their comments.
#[derive(Debug, Clone)]
pub struct Thread {
    pub question: question::Model,
    pub answers: Vec<answer::Model>,
    pub comments: Vec<comment::Model>,
}

pub struct ContentService<'a, C: ConnectionTrait> {
    conn: &'a C,
    rules: &'a ForumRules,
}

impl<'a, C: ConnectionTrait> ContentService<'a, C> {
    pub fn new(conn: &'a C, rules: &'a ForumRules) -> Self {
        Self { conn, rules }
    }

    async fn live_question(&self, id: i32) -> Result<question::Model, AppError> {
        let question = lock_question(self.conn, id).await?;
        if question.deleted {
            return Err(AppError::NotFound("Question not found".into()));
        }
        Ok(question)
    }

    async fn touch_question(
        &self,
        question: question::Model,
        actor_id: i32,
        now: DateTime<Utc>,
    ) -> Result<question::Model, DbErr> {
        let mut am: question::ActiveModel = question.into();
        am.last_activity_at = Set(now);
        am.last_activity_by = Set(actor_id);
        am.update(self.conn).await
    }

    pub async fn ask(
        &self,
        actor_id: i32,
        new: NewQuestion,
        now: DateTime<Utc>,
    ) -> Result<Posted<question::Model>, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        assert_can_post(&actor.standing())?;

        let question = question::ActiveModel {
            author_id: Set(actor_id),
            title: Set(new.title.trim().to_string()),
            body: Set(new.body),
            tagnames: Set(new.tags.join(" ")),
            score: Set(0),
            vote_up_count: Set(0),
            vote_down_count: Set(0),
            answer_count: Set(0),
            comment_count: Set(0),
            favourite_count: Set(0),
            offensive_flag_count: Set(0),
            wiki: Set(new.wiki),
            closed: Set(false),
            closed_by: Set(None),
            closed_at: Set(None),
            close_reason: Set(None),
            deleted: Set(false),
            deleted_by: Set(None),
            deleted_at: Set(None),
            last_activity_at: Set(now),
            last_activity_by: Set(actor_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        TagService::new(self.conn)
            .set_question_tags(question.id, &new.tags, actor_id, now)
            .await?;
        SubscriptionService::new(self.conn, self.rules)
            .follow(actor_id, question.id, now)
            .await?;

        let emails = ActivityService::new(self.conn)
            .record_post_update(
                PostUpdate {
                    actor_id,
                    activity_type: ActivityType::AskQuestion,
                    target_kind: TargetKind::Question,
                    target_id: question.id,
                    question: &question,
                    post_kind: PostKind::Question,
                    post_id: question.id,
                    post_author_id: actor_id,
                    text: &question.body,
                    previous_text: None,
                },
                self.rules,
                now,
            )
            .await?;

        tracing::info!(actor_id, question_id = question.id, "question asked");
        Ok(Posted {
            model: question,
            emails,
        })
    }

    pub async fn edit_question(
        &self,
        actor_id: i32,
        question_id: i32,
        edit: QuestionEdit,
        now: DateTime<Utc>,
    ) -> Result<Posted<question::Model>, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let question = self.live_question(question_id).await?;
        assert_can_edit_post(&actor.standing(), question.author_id)?;

        let tags_changed = match &edit.tags {
            Some(tags) => {
                TagService::new(self.conn)
                    .set_question_tags(question_id, tags, actor_id, now)
                    .await?
            }
            None => false,
        };

        let previous_body = question.body.clone();
        let mut am: question::ActiveModel = question.into();
        if let Some(title) = edit.title {
            am.title = Set(title.trim().to_string());
        }
        if let Some(body) = edit.body {
            am.body = Set(body);
        }
        if let Some(tags) = edit.tags {
            am.tagnames = Set(tags.join(" "));
        }
        am.updated_at = Set(now);
        am.last_activity_at = Set(now);
        am.last_activity_by = Set(actor_id);
        let question = am.update(self.conn).await?;

        let activities = ActivityService::new(self.conn);
        let emails = activities
            .record_post_update(
                PostUpdate {
                    actor_id,
                    activity_type: ActivityType::UpdateQuestion,
                    target_kind: TargetKind::Question,
                    target_id: question.id,
                    question: &question,
                    post_kind: PostKind::Question,
                    post_id: question.id,
                    post_author_id: question.author_id,
                    text: &question.body,
                    previous_text: Some(&previous_body),
                },
                self.rules,
                now,
            )
            .await?;

        if tags_changed {
            activities
                .record(
                    NewActivity {
                        actor_id,
                        activity_type: ActivityType::UpdateTags,
                        target_kind: TargetKind::Question,
                        target_id: question.id,
                        question_id: Some(question.id),
                        receivers: vec![question.author_id],
                    },
                    now,
                )
                .await?;
        }

        tracing::info!(actor_id, question_id, tags_changed, "question edited");
        Ok(Posted {
            model: question,
            emails,
        })
    }

    pub async fn answer(
        &self,
        actor_id: i32,
        question_id: i32,
        body: String,
        follow: bool,
        now: DateTime<Utc>,
    ) -> Result<Posted<answer::Model>, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        assert_can_post(&actor.standing())?;
        let question = self.live_question(question_id).await?;
        if question.closed {
            return Err(AppError::forbidden(
                "Sorry, this question is closed and no longer accepts answers",
            ));
        }

        let answer = answer::ActiveModel {
            question_id: Set(question_id),
            author_id: Set(actor_id),
            body: Set(body),
            score: Set(0),
            vote_up_count: Set(0),
            vote_down_count: Set(0),
            comment_count: Set(0),
            offensive_flag_count: Set(0),
            wiki: Set(false),
            accepted: Set(false),
            accepted_at: Set(None),
            deleted: Set(false),
            deleted_by: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        let answer_count = question.answer_count + 1;
        let mut am: question::ActiveModel = question.into();
        am.answer_count = Set(answer_count);
        am.last_activity_at = Set(now);
        am.last_activity_by = Set(actor_id);
        let question = am.update(self.conn).await?;

        if follow {
            SubscriptionService::new(self.conn, self.rules)
                .follow(actor_id, question_id, now)
                .await?;
        }

        let emails = ActivityService::new(self.conn)
            .record_post_update(
                PostUpdate {
                    actor_id,
                    activity_type: ActivityType::Answer,
                    target_kind: TargetKind::Answer,
                    target_id: answer.id,
                    question: &question,
                    post_kind: PostKind::Answer,
                    post_id: answer.id,
                    post_author_id: actor_id,
                    text: &answer.body,
                    previous_text: None,
                },
                self.rules,
                now,
            )
            .await?;

        tracing::info!(actor_id, question_id, answer_id = answer.id, "question answered");
        Ok(Posted {
            model: answer,
            emails,
        })
    }

    pub async fn edit_answer(
        &self,
        actor_id: i32,
        answer_id: i32,
        body: String,
        now: DateTime<Utc>,
    ) -> Result<Posted<answer::Model>, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let unlocked = answer::Entity::find_by_id(answer_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Answer not found".into()))?;
        let question = self.live_question(unlocked.question_id).await?;
        let answer = lock_answer(self.conn, answer_id).await?;
        if answer.deleted {
            return Err(AppError::NotFound("Answer not found".into()));
        }
        assert_can_edit_post(&actor.standing(), answer.author_id)?;

        let previous_body = answer.body.clone();
        let mut am: answer::ActiveModel = answer.into();
        am.body = Set(body);
        am.updated_at = Set(now);
        let answer = am.update(self.conn).await?;
        let question = self.touch_question(question, actor_id, now).await?;

        let emails = ActivityService::new(self.conn)
            .record_post_update(
                PostUpdate {
                    actor_id,
                    activity_type: ActivityType::UpdateAnswer,
                    target_kind: TargetKind::Answer,
                    target_id: answer.id,
                    question: &question,
                    post_kind: PostKind::Answer,
                    post_id: answer.id,
                    post_author_id: answer.author_id,
                    text: &answer.body,
                    previous_text: Some(&previous_body),
                },
                self.rules,
                now,
            )
            .await?;

        tracing::info!(actor_id, answer_id, "answer edited");
        Ok(Posted {
            model: answer,
            emails,
        })
    }

    pub async fn comment(
        &self,
        actor_id: i32,
        kind: PostKind,
        post_id: i32,
        body: String,
        now: DateTime<Utc>,
    ) -> Result<Posted<comment::Model>, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        assert_can_post(&actor.standing())?;

        // Question row is locked before the answer row, as in acceptance.
        let question_id = match kind {
            PostKind::Question => post_id,
            PostKind::Answer => {
                answer::Entity::find_by_id(post_id)
                    .one(self.conn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Answer not found".into()))?
                    .question_id
            }
        };
        self.live_question(question_id).await?;
        let post = Post::lock_live(self.conn, kind, post_id).await?;
        let post_author_id = post.author_id();

        let comment = comment::ActiveModel {
            post_kind: Set(kind),
            post_id: Set(post_id),
            author_id: Set(actor_id),
            body: Set(body),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        post.bump_comment_count(self.conn, 1).await?;
        // Reload so the question comment count bump is not overwritten.
        let question = question::Entity::find_by_id(question_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".into()))?;
        let question = self.touch_question(question, actor_id, now).await?;

        let activity_type = match kind {
            PostKind::Question => ActivityType::CommentQuestion,
            PostKind::Answer => ActivityType::CommentAnswer,
        };
        let emails = ActivityService::new(self.conn)
            .record_post_update(
                PostUpdate {
                    actor_id,
                    activity_type,
                    target_kind: TargetKind::Comment,
                    target_id: comment.id,
                    question: &question,
                    post_kind: kind,
                    post_id,
                    post_author_id,
                    text: &comment.body,
                    previous_text: None,
                },
                self.rules,
                now,
            )
            .await?;

        tracing::info!(actor_id, post_kind = %kind, post_id, comment_id = comment.id, "comment posted");
        Ok(Posted {
            model: comment,
            emails,
        })
    }

    pub async fn delete_comment(&self, actor_id: i32, comment_id: i32) -> Result<(), AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        let comment = comment::Entity::find_by_id(comment_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
        assert_can_delete_comment(&actor.standing(), comment.author_id)?;

        let post = Post::lock(self.conn, comment.post_kind, comment.post_id).await?;
        comment::Entity::delete_by_id(comment_id)
            .exec(self.conn)
            .await?;
        post.bump_comment_count(self.conn, -1).await?;

        tracing::info!(actor_id, comment_id, "comment deleted");
        Ok(())
    }

    /// Record a visit and consume the responses the visitor has now seen.
    ///
    /// Returns how many pending responses were cleared.
    pub async fn visit_question(
        &self,
        user_id: i32,
        question_id: i32,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let previous = question_view::Entity::find_by_id((question_id, user_id))
            .one(self.conn)
            .await?
            .map(|v| v.viewed_at);

        question_view::Entity::insert(question_view::ActiveModel {
            question_id: Set(question_id),
            user_id: Set(user_id),
            viewed_at: Set(now),
        })
        .on_conflict(
            OnConflict::columns([
                question_view::Column::QuestionId,
                question_view::Column::UserId,
            ])
            .update_column(question_view::Column::ViewedAt)
            .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;

        let mut seen = activity::Entity::find()
            .filter(activity::Column::QuestionId.eq(question_id))
            .filter(activity::Column::ActivityType.is_in(ActivityType::RESPONSE_TYPES.iter().copied()));
        if let Some(previous) = previous {
            seen = seen.filter(activity::Column::ActiveAt.gt(previous));
        }
        let activity_ids: BTreeSet<i32> = seen
            .all(self.conn)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        if activity_ids.is_empty() {
            return Ok(0);
        }

        let cleared = activity_recipient::Entity::delete_many()
            .filter(activity_recipient::Column::UserId.eq(user_id))
            .filter(activity_recipient::Column::ActivityId.is_in(activity_ids))
            .exec(self.conn)
            .await?
            .rows_affected;
        if cleared == 0 {
            return Ok(0);
        }

        let Some(visitor) = user::Entity::find_by_id(user_id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
        else {
            return Ok(cleared);
        };
        let mut count = visitor.response_count;
        for _ in 0..cleared {
            count = decrement_response_count(user_id, count);
        }
        let mut am: user::ActiveModel = visitor.into();
        am.response_count = Set(count);
        am.update(self.conn).await?;

        tracing::debug!(user_id, question_id, cleared, "responses consumed on visit");
        Ok(cleared)
    }

    pub async fn load_thread(&self, question_id: i32) -> Result<Thread, AppError> {
        let question = question::Entity::find_by_id(question_id)
            .one(self.conn)
            .await?
            .filter(|q| !q.deleted)
            .ok_or_else(|| AppError::NotFound("Question not found".into()))?;

        let answers = answer::Entity::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .filter(answer::Column::Deleted.eq(false))
            .order_by_desc(answer::Column::Accepted)
            .order_by_desc(answer::Column::Score)
            .order_by_asc(answer::Column::CreatedAt)
            .all(self.conn)
            .await?;

        let answer_ids: Vec<i32> = answers.iter().map(|a| a.id).collect();
        let mut on_posts = Condition::any().add(
            Condition::all()
                .add(comment::Column::PostKind.eq(PostKind::Question))
                .add(comment::Column::PostId.eq(question_id)),
        );
        if !answer_ids.is_empty() {
            on_posts = on_posts.add(
                Condition::all()
                    .add(comment::Column::PostKind.eq(PostKind::Answer))
                    .add(comment::Column::PostId.is_in(answer_ids)),
            );
        }
        let comments = comment::Entity::find()
            .filter(on_posts)
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.conn)
            .await?;

        Ok(Thread {
            question,
            answers,
            comments,
        })
    }
}
