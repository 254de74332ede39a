
mod accept;
mod auth;
mod command;
mod flag;
mod moderation;
mod notification;
mod vote;
