use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::entity::user_message;

pub struct MessageService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> MessageService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn push(
        &self,
        user_id: i32,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<user_message::Model, DbErr> {
        user_message::ActiveModel {
            user_id: Set(user_id),
            message: Set(message.into()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    /// Pending messages, oldest first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<user_message::Model>, DbErr> {
        user_message::Entity::find()
            .filter(user_message::Column::UserId.eq(user_id))
            .order_by_asc(user_message::Column::CreatedAt)
            .order_by_asc(user_message::Column::Id)
            .all(self.conn)
            .await
    }

    /// Drop every pending message; returns how many were removed.
    pub async fn clear(&self, user_id: i32) -> Result<u64, DbErr> {
        let res = user_message::Entity::delete_many()
            .filter(user_message::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await?;
        Ok(res.rows_affected)
    }
}
