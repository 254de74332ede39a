use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub question_id: i32,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub score: i32,
    pub vote_up_count: i32,
    pub vote_down_count: i32,
    pub comment_count: i32,
    pub offensive_flag_count: i32,
    pub wiki: bool,

    /// At most one accepted answer per question.
    pub accepted: bool,
    pub accepted_at: Option<DateTimeUtc>,

    pub deleted: bool,
    pub deleted_by: Option<i32>,
    pub deleted_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
