use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::ReputeReason;
use common::reputation::{ReputationChange, apply_delta, capped_gain};
use common::vote::utc_day_bounds;
use sea_orm::sea_query::LockType;
use sea_orm::*;

use crate::entity::{repute, user};

/// A single reputation adjustment.
#[derive(Debug, Clone)]
pub struct Adjustment {
    pub user_id: i32,
    pub delta: i32,
    pub reason: ReputeReason,
    pub question_id: Option<i32>,
    pub comment: Option<String>,
}

impl Adjustment {
    pub fn new(user_id: i32, delta: i32, reason: ReputeReason, question_id: Option<i32>) -> Self {
        Self {
            user_id,
            delta,
            reason,
            question_id,
            comment: None,
        }
    }
}

/// Every reputation change goes through here so the floor and the ledger
/// are never bypassed.
pub struct ReputationService<'a, C: ConnectionTrait> {
    conn: &'a C,
    max_gain_per_day: i32,
}

impl<'a, C: ConnectionTrait> ReputationService<'a, C> {
    pub fn new(conn: &'a C, max_gain_per_day: i32) -> Self {
        Self {
            conn,
            max_gain_per_day,
        }
    }

    /// Positive reputation already gained today from capped reasons.
    async fn capped_gain_today(&self, user_id: i32, now: DateTime<Utc>) -> Result<i32, DbErr> {
        let (start, end) = utc_day_bounds(now);
        let rows = repute::Entity::find()
            .filter(repute::Column::UserId.eq(user_id))
            .filter(repute::Column::Reason.eq(ReputeReason::GainByUpvoted))
            .filter(repute::Column::ReputedAt.gte(start))
            .filter(repute::Column::ReputedAt.lt(end))
            .all(self.conn)
            .await?;
        Ok(rows.iter().map(|r| r.positive).sum())
    }

    /// `FOR NO KEY UPDATE`: foreign-key checks from rows referencing the user
    /// must not block on it.
    async fn lock_user(&self, user_id: i32) -> Result<user::Model, DbErr> {
        user::Entity::find_by_id(user_id)
            .lock(LockType::NoKeyUpdate)
            .one(self.conn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {user_id}")))
    }

    /// Apply one adjustment: lock the user, clamp at the floor, write the ledger row.
    pub async fn adjust(
        &self,
        adjustment: Adjustment,
        now: DateTime<Utc>,
    ) -> Result<ReputationChange, DbErr> {
        let user = self.lock_user(adjustment.user_id).await?;

        let mut delta = adjustment.delta;
        if adjustment.reason.is_capped() && delta > 0 {
            let gained = self.capped_gain_today(user.id, now).await?;
            delta = capped_gain(delta, gained, self.max_gain_per_day);
            if delta < adjustment.delta {
                tracing::debug!(
                    user_id = user.id,
                    requested = adjustment.delta,
                    applied = delta,
                    "daily reputation cap reached"
                );
            }
        }

        let change = apply_delta(user.reputation, delta);
        if change.applied == 0 && adjustment.comment.is_none() {
            return Ok(change);
        }

        let mut am: user::ActiveModel = user.into();
        am.reputation = Set(change.reputation);
        am.update(self.conn).await?;

        let (positive, negative) = change.ledger_split();
        repute::ActiveModel {
            user_id: Set(adjustment.user_id),
            question_id: Set(adjustment.question_id),
            positive: Set(positive),
            negative: Set(negative),
            reason: Set(adjustment.reason),
            comment: Set(adjustment.comment),
            reputation: Set(change.reputation),
            reputed_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(change)
    }

    /// Apply adjustments that may touch several users.
    ///
    /// Affected user rows are locked up front in ascending id order.
    pub async fn adjust_all(
        &self,
        adjustments: Vec<Adjustment>,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let adjustments: Vec<Adjustment> =
            adjustments.into_iter().filter(|a| a.delta != 0).collect();
        let user_ids: BTreeSet<i32> = adjustments.iter().map(|a| a.user_id).collect();
        for user_id in user_ids {
            self.lock_user(user_id).await?;
        }
        for adjustment in adjustments {
            self.adjust(adjustment, now).await?;
        }
        Ok(())
    }

    /// Ledger rows for a user, newest first.
    pub async fn history(&self, user_id: i32, limit: u64) -> Result<Vec<repute::Model>, DbErr> {
        repute::Entity::find()
            .filter(repute::Column::UserId.eq(user_id))
            .order_by_desc(repute::Column::ReputedAt)
            .order_by_desc(repute::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await
    }
}
