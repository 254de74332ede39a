//! Tags on questions and per-user tag marks.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::TagMarkReason;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entity::{marked_tag, question_tag, tag, user};
use crate::error::AppError;

pub struct TagService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TagService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    async fn find_or_create(
        &self,
        name: &str,
        creator_id: i32,
        now: DateTime<Utc>,
    ) -> Result<tag::Model, DbErr> {
        if let Some(existing) = tag::Entity::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.conn)
            .await?
        {
            return Ok(existing);
        }
        tag::ActiveModel {
            name: Set(name.to_string()),
            used_count: Set(0),
            created_by: Set(creator_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    async fn bump_used_count(&self, tag_ids: Vec<i32>, delta: i32) -> Result<(), DbErr> {
        if tag_ids.is_empty() || delta == 0 {
            return Ok(());
        }
        tag::Entity::update_many()
            .col_expr(
                tag::Column::UsedCount,
                Expr::cust(format!("GREATEST(\"used_count\" + ({delta}), 0)")),
            )
            .filter(tag::Column::Id.is_in(tag_ids))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Point a question at exactly `names`, creating missing tags and
    /// keeping `used_count` in step. Returns whether the set changed.
    pub async fn set_question_tags(
        &self,
        question_id: i32,
        names: &[String],
        actor_id: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let current: BTreeSet<i32> = question_tag::Entity::find()
            .filter(question_tag::Column::QuestionId.eq(question_id))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|qt| qt.tag_id)
            .collect();

        let mut wanted = BTreeSet::new();
        for name in names {
            wanted.insert(self.find_or_create(name, actor_id, now).await?.id);
        }

        let removed: Vec<i32> = current.difference(&wanted).copied().collect();
        let added: Vec<i32> = wanted.difference(&current).copied().collect();
        if removed.is_empty() && added.is_empty() {
            return Ok(false);
        }

        if !removed.is_empty() {
            question_tag::Entity::delete_many()
                .filter(question_tag::Column::QuestionId.eq(question_id))
                .filter(question_tag::Column::TagId.is_in(removed.clone()))
                .exec(self.conn)
                .await?;
        }
        if !added.is_empty() {
            question_tag::Entity::insert_many(added.iter().map(|&tag_id| {
                question_tag::ActiveModel {
                    question_id: Set(question_id),
                    tag_id: Set(tag_id),
                }
            }))
            .exec_without_returning(self.conn)
            .await?;
        }
        self.bump_used_count(removed, -1).await?;
        self.bump_used_count(added, 1).await?;
        Ok(true)
    }

    /// Shift `used_count` of every tag on a question, used when the question
    /// is deleted or restored.
    pub async fn adjust_question_tag_counts(
        &self,
        question_id: i32,
        delta: i32,
    ) -> Result<(), DbErr> {
        let tag_ids: Vec<i32> = question_tag::Entity::find()
            .filter(question_tag::Column::QuestionId.eq(question_id))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|qt| qt.tag_id)
            .collect();
        self.bump_used_count(tag_ids, delta).await
    }

    /// Mark a tag as interesting or ignored, or clear the mark with `None`.
    ///
    /// Unknown tags are ignored.
    pub async fn mark(
        &self,
        user_id: i32,
        name: &str,
        reason: Option<TagMarkReason>,
    ) -> Result<(), DbErr> {
        let Some(tag) = tag::Entity::find()
            .filter(tag::Column::Name.eq(name.to_lowercase()))
            .one(self.conn)
            .await?
        else {
            tracing::debug!(user_id, tag = name, "mark on unknown tag ignored");
            return Ok(());
        };

        match reason {
            None => {
                marked_tag::Entity::delete_many()
                    .filter(marked_tag::Column::UserId.eq(user_id))
                    .filter(marked_tag::Column::TagId.eq(tag.id))
                    .exec(self.conn)
                    .await?;
            }
            Some(reason) => {
                marked_tag::Entity::insert(marked_tag::ActiveModel {
                    user_id: Set(user_id),
                    tag_id: Set(tag.id),
                    reason: Set(reason),
                })
                .on_conflict(
                    OnConflict::columns([marked_tag::Column::UserId, marked_tag::Column::TagId])
                        .update_column(marked_tag::Column::Reason)
                        .to_owned(),
                )
                .exec_without_returning(self.conn)
                .await?;
            }
        }
        Ok(())
    }

    /// Flip `hide_ignored_questions` and return the new value.
    pub async fn toggle_ignored_questions(&self, user_id: i32) -> Result<bool, AppError> {
        let user = user::Entity::find_by_id(user_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        let hide = !user.hide_ignored_questions;
        let mut am: user::ActiveModel = user.into();
        am.hide_ignored_questions = Set(hide);
        am.update(self.conn).await?;
        Ok(hide)
    }
}

