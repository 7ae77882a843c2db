//! # deadliner-core
//!
//! Core types, traits, configuration, and error handling for Deadliner.

pub mod config;
pub mod error;
pub mod job;
pub mod task;
pub mod traits;
