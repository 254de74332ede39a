use common::ReputeReason;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only reputation ledger.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repute")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub question_id: Option<i32>,

    pub positive: i32,
    pub negative: i32,
    pub reason: ReputeReason,
    /// Set for manual moderation only.
    pub comment: Option<String>,
    /// Balance after the change.
    pub reputation: i32,
    pub reputed_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
