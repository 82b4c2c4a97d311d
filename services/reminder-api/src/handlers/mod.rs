//! REST API handlers

pub mod ai;
pub mod cron;
pub mod health;
pub mod pantry;
pub mod shared;

pub use health::*;
