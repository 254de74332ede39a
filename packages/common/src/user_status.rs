#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moderation status of a user account.
///
/// Administrator rights are stored separately (`is_administrator`), so an
/// administrator may carry any status here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")
)]
pub enum UserStatus {
    /// Regular account in good standing.
    #[serde(rename = "a")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "a"))]
    Approved,
    /// Account under observation; behaves like approved.
    #[serde(rename = "w")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "w"))]
    Watched,
    /// Temporarily barred from every mutating action.
    #[serde(rename = "s")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "s"))]
    Suspended,
    /// Permanently barred from every mutating action.
    #[serde(rename = "b")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "b"))]
    Blocked,
    /// Forum moderator.
    #[serde(rename = "m")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "m"))]
    Moderator,
}

impl UserStatus {
    pub const ALL: &'static [UserStatus] = &[
        Self::Approved,
        Self::Watched,
        Self::Suspended,
        Self::Blocked,
        Self::Moderator,
    ];

    /// Single-letter code stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "a",
            Self::Watched => "w",
            Self::Suspended => "s",
            Self::Blocked => "b",
            Self::Moderator => "m",
        }
    }

    /// Human-readable label used on profiles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approved => "Approved User",
            Self::Watched => "Watched User",
            Self::Suspended => "Suspended User",
            Self::Blocked => "Blocked User",
            Self::Moderator => "Forum Moderator",
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Approved
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Self::Approved),
            "w" => Ok(Self::Watched),
            "s" => Ok(Self::Suspended),
            "b" => Ok(Self::Blocked),
            "m" => Ok(Self::Moderator),
            other => Err(format!(
                "Invalid user status '{other}'. Valid values: a, w, s, b, m"
            )),
        }
    }
}
