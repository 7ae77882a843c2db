//! # deadliner-channels
//!
//! Notification gateways for Deadliner.

pub mod log;
pub mod telegram;
pub mod utils;

pub use log::LogNotifier;
pub use telegram::TelegramNotifier;
