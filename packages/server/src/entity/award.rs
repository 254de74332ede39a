use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "award")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub badge_id: i32,
    #[sea_orm(belongs_to, from = "badge_id", to = "id")]
    pub badge: HasOne<super::badge::Entity>,

    pub awarded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
