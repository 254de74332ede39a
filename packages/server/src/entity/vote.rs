use common::{PostKind, VoteDirection};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique on (`user_id`, `post_kind`, `post_id`); see `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub post_kind: PostKind,
    pub post_id: i32,
    pub direction: VoteDirection,
    /// Kept when the vote is flipped.
    pub voted_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
