//! Questions and answers behind one handle, for operations that treat
//! both post kinds alike.

use chrono::{DateTime, Utc};
use common::PostKind;
use common::vote::ScoreChange;
use sea_orm::sea_query::LockType;
use sea_orm::*;

use crate::entity::{answer, question, user};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub enum Post {
    Question(question::Model),
    Answer(answer::Model),
}

/// Load a user or fail with `NOT_FOUND`.
pub async fn find_user<C: ConnectionTrait>(conn: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Load a question with a row lock.
pub async fn lock_question<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

/// Load an answer with a row lock.
pub async fn lock_answer<C: ConnectionTrait>(conn: &C, id: i32) -> Result<answer::Model, AppError> {
    answer::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Answer not found".into()))
}

impl Post {
    /// Load a post with a row lock. Deleted posts are returned too.
    pub async fn lock<C: ConnectionTrait>(
        conn: &C,
        kind: PostKind,
        id: i32,
    ) -> Result<Self, AppError> {
        Ok(match kind {
            PostKind::Question => Post::Question(lock_question(conn, id).await?),
            PostKind::Answer => Post::Answer(lock_answer(conn, id).await?),
        })
    }

    /// Like [`Post::lock`] but treats a deleted post as missing.
    pub async fn lock_live<C: ConnectionTrait>(
        conn: &C,
        kind: PostKind,
        id: i32,
    ) -> Result<Self, AppError> {
        let post = Self::lock(conn, kind, id).await?;
        if post.deleted() {
            return Err(AppError::NotFound(format!("{} not found", post.label())));
        }
        Ok(post)
    }

    pub fn kind(&self) -> PostKind {
        match self {
            Post::Question(_) => PostKind::Question,
            Post::Answer(_) => PostKind::Answer,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Post::Question(_) => "Question",
            Post::Answer(_) => "Answer",
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Post::Question(q) => q.id,
            Post::Answer(a) => a.id,
        }
    }

    pub fn author_id(&self) -> i32 {
        match self {
            Post::Question(q) => q.author_id,
            Post::Answer(a) => a.author_id,
        }
    }

    /// The question this post lives under.
    pub fn question_id(&self) -> i32 {
        match self {
            Post::Question(q) => q.id,
            Post::Answer(a) => a.question_id,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Post::Question(q) => &q.body,
            Post::Answer(a) => &a.body,
        }
    }

    pub fn wiki(&self) -> bool {
        match self {
            Post::Question(q) => q.wiki,
            Post::Answer(a) => a.wiki,
        }
    }

    pub fn deleted(&self) -> bool {
        match self {
            Post::Question(q) => q.deleted,
            Post::Answer(a) => a.deleted,
        }
    }

    pub fn score(&self) -> i32 {
        match self {
            Post::Question(q) => q.score,
            Post::Answer(a) => a.score,
        }
    }

    pub fn offensive_flag_count(&self) -> i32 {
        match self {
            Post::Question(q) => q.offensive_flag_count,
            Post::Answer(a) => a.offensive_flag_count,
        }
    }

    pub async fn apply_score<C: ConnectionTrait>(
        self,
        conn: &C,
        change: ScoreChange,
    ) -> Result<Self, DbErr> {
        Ok(match self {
            Post::Question(q) => {
                let mut am: question::ActiveModel = q.clone().into();
                am.score = Set(q.score + change.score);
                am.vote_up_count = Set(std::cmp::Ord::max(q.vote_up_count + change.up, 0));
                am.vote_down_count = Set(std::cmp::Ord::max(q.vote_down_count + change.down, 0));
                Post::Question(am.update(conn).await?)
            }
            Post::Answer(a) => {
                let mut am: answer::ActiveModel = a.clone().into();
                am.score = Set(a.score + change.score);
                am.vote_up_count = Set(std::cmp::Ord::max(a.vote_up_count + change.up, 0));
                am.vote_down_count = Set(std::cmp::Ord::max(a.vote_down_count + change.down, 0));
                Post::Answer(am.update(conn).await?)
            }
        })
    }

    pub async fn set_flag_count<C: ConnectionTrait>(
        self,
        conn: &C,
        count: i32,
    ) -> Result<Self, DbErr> {
        Ok(match self {
            Post::Question(q) => {
                let mut am: question::ActiveModel = q.into();
                am.offensive_flag_count = Set(count);
                Post::Question(am.update(conn).await?)
            }
            Post::Answer(a) => {
                let mut am: answer::ActiveModel = a.into();
                am.offensive_flag_count = Set(count);
                Post::Answer(am.update(conn).await?)
            }
        })
    }

    pub async fn bump_comment_count<C: ConnectionTrait>(
        self,
        conn: &C,
        delta: i32,
    ) -> Result<Self, DbErr> {
        Ok(match self {
            Post::Question(q) => {
                let count = std::cmp::Ord::max(q.comment_count + delta, 0);
                let mut am: question::ActiveModel = q.into();
                am.comment_count = Set(count);
                Post::Question(am.update(conn).await?)
            }
            Post::Answer(a) => {
                let count = std::cmp::Ord::max(a.comment_count + delta, 0);
                let mut am: answer::ActiveModel = a.into();
                am.comment_count = Set(count);
                Post::Answer(am.update(conn).await?)
            }
        })
    }

    /// Soft delete or restore, keeping `answer_count` and tag usage in step.
    pub async fn set_deleted<C: ConnectionTrait>(
        self,
        conn: &C,
        deleted: bool,
        actor_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        if self.deleted() == deleted {
            return Ok(self);
        }
        let (deleted_by, deleted_at) = if deleted {
            (Some(actor_id), Some(now))
        } else {
            (None, None)
        };
        let delta = if deleted { -1 } else { 1 };

        Ok(match self {
            Post::Question(q) => {
                let id = q.id;
                let mut am: question::ActiveModel = q.into();
                am.deleted = Set(deleted);
                am.deleted_by = Set(deleted_by);
                am.deleted_at = Set(deleted_at);
                let q = am.update(conn).await?;
                super::tag::TagService::new(conn)
                    .adjust_question_tag_counts(id, delta)
                    .await?;
                Post::Question(q)
            }
            Post::Answer(a) => {
                let question_id = a.question_id;
                let mut am: answer::ActiveModel = a.into();
                am.deleted = Set(deleted);
                am.deleted_by = Set(deleted_by);
                am.deleted_at = Set(deleted_at);
                let a = am.update(conn).await?;
                if let Some(q) = question::Entity::find_by_id(question_id).one(conn).await? {
                    let count = std::cmp::Ord::max(q.answer_count + delta, 0);
                    let mut qam: question::ActiveModel = q.into();
                    qam.answer_count = Set(count);
                    qam.update(conn).await?;
                }
                Post::Answer(a)
            }
        })
    }
}
