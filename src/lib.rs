//! fitjournal - Fitness journal service
//!
//! Exercises, weekly routines, workout logging and next-workout planning
//! over a single SQLite database.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod exercises;
pub mod planner;

pub use db::Database;
