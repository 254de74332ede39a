use common::{EmailFrequency, FeedType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique on (`subscriber_id`, `feed_type`); see `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_feed_setting")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub subscriber_id: i32,
    #[sea_orm(belongs_to, from = "subscriber_id", to = "id")]
    pub subscriber: HasOne<super::user::Entity>,

    pub feed_type: FeedType,
    pub frequency: EmailFrequency,
    pub added_at: DateTimeUtc,
    pub reported_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
