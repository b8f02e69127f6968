//! Pomodoro session log with cloud sync, reconciliation and periodic
//! email summaries.

pub mod cli;
pub mod config;
pub mod services;
pub mod types;

pub use config::Config;
