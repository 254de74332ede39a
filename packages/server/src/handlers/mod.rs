pub mod auth;
pub mod badge;
pub mod command;
pub mod question;
pub mod user;
