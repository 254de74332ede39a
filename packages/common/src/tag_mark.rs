#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};

/// Whether a user marked a tag as interesting or ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")
)]
#[serde(rename_all = "snake_case")]
pub enum TagMarkReason {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "good"))]
    Good,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "bad"))]
    Bad,
}

/// Which marked tags drive the question list filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
#[serde(rename_all = "snake_case")]
pub enum TagFilterSetting {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ignored"))]
    Ignored,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "interesting"))]
    Interesting,
}

pub const MAX_TAGS_PER_QUESTION: usize = 5;
pub const MAX_TAG_LENGTH: usize = 64;

/// Split a space separated tag string, dropping duplicates but keeping order.
pub fn split_tagnames(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split_whitespace() {
        let name = name.to_lowercase();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

pub fn is_valid_tag(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_TAG_LENGTH
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '.' | '-' | '_'))
}
