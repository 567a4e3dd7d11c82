//! Scheduling core for a personal task/reminder manager.
//!
//! Front ends (chat bot, HTTP API) create tasks and attach reminders through
//! [`db::Db`]; the [`jobs`] module runs the periodic loops that deliver due
//! reminders, reschedule recurring ones and keep subscriptions in check.

pub mod config;
pub mod db;
pub mod jobs;
pub mod models;
pub mod notify;
pub mod recurrence;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
