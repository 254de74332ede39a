use chrono::{DateTime, Utc};
use common::BadgeClass;
use serde::{Deserialize, Serialize};

use crate::entity::{award, badge};

#[derive(Serialize, utoipa::ToSchema)]
pub struct BadgeResponse {
    pub id: i32,
    #[schema(example = "Nice Answer")]
    pub name: String,
    pub class: BadgeClass,
    pub description: String,
    /// Whether a user may receive it more than once.
    pub multiple: bool,
    pub awarded_count: i32,
}

impl From<badge::Model> for BadgeResponse {
    fn from(m: badge::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            class: m.class,
            description: m.description,
            multiple: m.multiple,
            awarded_count: m.awarded_count,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AwardRequest {
    #[schema(example = 42)]
    pub user_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AwardResponse {
    pub id: i32,
    pub user_id: i32,
    pub badge_id: i32,
    pub awarded_at: DateTime<Utc>,
}

impl From<award::Model> for AwardResponse {
    fn from(m: award::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            badge_id: m.badge_id,
            awarded_at: m.awarded_at,
        }
    }
}
