#![forbid(unsafe_code)]

//! Slack webhook service that turns mentions of allow-listed users into
//! personal task lists kept in each user's DM with the bot.

pub mod config;
pub mod errors;
pub mod mentions;
pub mod models;
pub mod persistence;
pub mod slack;
pub mod state;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
