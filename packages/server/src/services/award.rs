use chrono::{DateTime, Utc};
use common::badge::award_message;
use common::{ActivityType, BadgeClass, TargetKind};
use sea_orm::sea_query::LockType;
use sea_orm::*;

use crate::entity::{award, badge, user};
use crate::error::AppError;
use crate::services::activity::{ActivityService, NewActivity};
use crate::services::message::MessageService;
use crate::services::post::find_user;

pub struct AwardService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AwardService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list_badges(&self) -> Result<Vec<badge::Model>, DbErr> {
        badge::Entity::find()
            .order_by_asc(badge::Column::Id)
            .all(self.conn)
            .await
    }

    /// Give a badge to a user. Only staff may award badges by hand.
    pub async fn award(
        &self,
        actor_id: i32,
        badge_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<award::Model, AppError> {
        let actor = find_user(self.conn, actor_id).await?;
        if !actor.standing().is_staff() {
            return Err(AppError::forbidden(
                "Sorry, only moderators and administrators can award badges",
            ));
        }

        let badge = badge::Entity::find_by_id(badge_id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Badge not found".into()))?;
        let recipient = user::Entity::find_by_id(user_id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if !badge.multiple {
            let already = award::Entity::find()
                .filter(award::Column::UserId.eq(user_id))
                .filter(award::Column::BadgeId.eq(badge_id))
                .count(self.conn)
                .await?;
            if already > 0 {
                return Err(AppError::Conflict(format!(
                    "User already has the badge '{}'",
                    badge.name
                )));
            }
        }

        let award = award::ActiveModel {
            user_id: Set(user_id),
            badge_id: Set(badge_id),
            awarded_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        let class = badge.class;
        let name = badge.name.clone();
        let awarded_count = badge.awarded_count + 1;
        let mut bam: badge::ActiveModel = badge.into();
        bam.awarded_count = Set(awarded_count);
        bam.update(self.conn).await?;

        let mut uam: user::ActiveModel = recipient.clone().into();
        match class {
            BadgeClass::Gold => uam.gold = Set(recipient.gold + 1),
            BadgeClass::Silver => uam.silver = Set(recipient.silver + 1),
            BadgeClass::Bronze => uam.bronze = Set(recipient.bronze + 1),
        }
        uam.update(self.conn).await?;

        ActivityService::new(self.conn)
            .record(
                NewActivity {
                    actor_id,
                    activity_type: ActivityType::Prize,
                    target_kind: TargetKind::Award,
                    target_id: award.id,
                    question_id: None,
                    receivers: vec![user_id],
                },
                now,
            )
            .await?;
        MessageService::new(self.conn)
            .push(user_id, award_message(&name), now)
            .await?;

        tracing::info!(actor_id, user_id, badge = %name, "badge awarded");
        Ok(award)
    }
}
