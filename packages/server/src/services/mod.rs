pub mod accept;
pub mod activity;
pub mod award;
pub mod content;
pub mod favorite;
pub mod flag;
pub mod message;
pub mod moderation;
pub mod notify;
pub mod post;
pub mod reputation;
pub mod subscription;
pub mod tag;
pub mod vote;
