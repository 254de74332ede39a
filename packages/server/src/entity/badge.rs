use common::BadgeClass;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    pub class: BadgeClass,
    pub description: String,
    /// Whether the same user may receive it more than once.
    pub multiple: bool,
    pub awarded_count: i32,
}

impl ActiveModelBehavior for ActiveModel {}
