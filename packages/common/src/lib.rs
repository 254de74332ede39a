pub mod activity;
pub mod badge;
pub mod command;
pub mod config;
pub mod counter;
pub mod email_feed;
pub mod permission;
pub mod post_kind;
pub mod reputation;
pub mod tag_mark;
pub mod user_status;
pub mod vote;

pub use activity::{ActivityType, TargetKind};
pub use badge::BadgeClass;
pub use config::ForumRules;
pub use email_feed::{EmailFrequency, FeedType};
pub use permission::{Denial, Standing};
pub use post_kind::{CloseReason, PostKind};
pub use reputation::ReputeReason;
pub use tag_mark::{TagFilterSetting, TagMarkReason};
pub use user_status::UserStatus;
pub use vote::VoteDirection;
