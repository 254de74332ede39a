use common::CloseReason;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    /// Space separated, lower-cased.
    pub tagnames: String,

    pub score: i32,
    pub vote_up_count: i32,
    pub vote_down_count: i32,
    pub answer_count: i32,
    pub comment_count: i32,
    pub favourite_count: i32,
    pub offensive_flag_count: i32,
    pub wiki: bool,

    pub closed: bool,
    pub closed_by: Option<i32>,
    pub closed_at: Option<DateTimeUtc>,
    pub close_reason: Option<CloseReason>,

    pub deleted: bool,
    pub deleted_by: Option<i32>,
    pub deleted_at: Option<DateTimeUtc>,

    pub last_activity_at: DateTimeUtc,
    pub last_activity_by: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
