use common::{ActivityType, TargetKind};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only event log. Pending receivers live in `activity_recipient`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Actor.
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub activity_type: ActivityType,
    pub target_kind: TargetKind,
    pub target_id: i32,
    /// Question the target belongs to, if any.
    pub question_id: Option<i32>,
    pub active_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
