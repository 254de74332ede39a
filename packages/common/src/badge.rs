#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")
)]
#[serde(rename_all = "snake_case")]
pub enum BadgeClass {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "gold"))]
    Gold,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "silver"))]
    Silver,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "bronze"))]
    Bronze,
}

impl BadgeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
        }
    }
}

impl fmt::Display for BadgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge definition created at startup if missing.
#[derive(Debug, Clone, Copy)]
pub struct DefaultBadge {
    pub name: &'static str,
    pub class: BadgeClass,
    pub description: &'static str,
    pub multiple: bool,
}

pub const DEFAULT_BADGES: &[DefaultBadge] = &[
    DefaultBadge {
        name: "Student",
        class: BadgeClass::Bronze,
        description: "Asked first question with at least one up vote",
        multiple: false,
    },
    DefaultBadge {
        name: "Teacher",
        class: BadgeClass::Bronze,
        description: "Answered first question with at least one up vote",
        multiple: false,
    },
    DefaultBadge {
        name: "Supporter",
        class: BadgeClass::Bronze,
        description: "First up vote",
        multiple: false,
    },
    DefaultBadge {
        name: "Critic",
        class: BadgeClass::Bronze,
        description: "First down vote",
        multiple: false,
    },
    DefaultBadge {
        name: "Scholar",
        class: BadgeClass::Bronze,
        description: "Asked a question and accepted an answer",
        multiple: false,
    },
    DefaultBadge {
        name: "Citizen Patrol",
        class: BadgeClass::Bronze,
        description: "First flagged post",
        multiple: false,
    },
    DefaultBadge {
        name: "Nice Answer",
        class: BadgeClass::Bronze,
        description: "Answer voted up 10 times",
        multiple: true,
    },
    DefaultBadge {
        name: "Good Answer",
        class: BadgeClass::Silver,
        description: "Answer voted up 25 times",
        multiple: true,
    },
    DefaultBadge {
        name: "Great Answer",
        class: BadgeClass::Gold,
        description: "Answer voted up 100 times",
        multiple: true,
    },
    DefaultBadge {
        name: "Civic Duty",
        class: BadgeClass::Silver,
        description: "Voted 300 times",
        multiple: false,
    },
];

/// Message queued for a user who received a badge.
pub fn award_message(badge_name: &str) -> String {
    format!("Congratulations, you have received a badge '{badge_name}'.")
}
