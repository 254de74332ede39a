use common::{Standing, TagFilterSetting, UserStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,

    pub email: String,
    pub email_isvalid: bool,
    /// Pending email validation key.
    pub email_key: Option<String>,
    /// Hex SHA-256 of the normalized email.
    pub gravatar: String,

    pub status: UserStatus,
    pub is_administrator: bool,

    /// Never below 1.
    pub reputation: i32,
    pub gold: i32,
    pub silver: i32,
    pub bronze: i32,
    /// Unseen responses; never negative.
    pub response_count: i32,

    pub questions_per_page: i32,
    pub hide_ignored_questions: bool,
    pub tag_filter_setting: TagFilterSetting,

    pub real_name: String,
    pub website: String,
    pub location: String,
    pub date_of_birth: Option<Date>,
    #[sea_orm(column_type = "Text")]
    pub about: String,

    pub last_seen: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn standing(&self) -> Standing {
        Standing {
            user_id: self.id,
            reputation: self.reputation,
            status: self.status,
            is_administrator: self.is_administrator,
        }
    }
}
