pub mod activity;
pub mod activity_recipient;
pub mod answer;
pub mod award;
pub mod badge;
pub mod comment;
pub mod email_feed_setting;
pub mod favorite_question;
pub mod flagged_item;
pub mod marked_tag;
pub mod question;
pub mod question_follower;
pub mod question_tag;
pub mod question_view;
pub mod repute;
pub mod tag;
pub mod user;
pub mod user_message;
pub mod vote;
