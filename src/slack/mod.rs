//! Slack bridge layer modules.

pub mod client;
pub mod handlers;
pub mod platform;
pub mod router;
pub mod webhook;
