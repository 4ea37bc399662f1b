//! # resubscribe
//!
//! Resumable migration of channel subscriptions onto a new YouTube account.
//!
//! Reads channel IDs from a CSV export, subscribes to each one through the
//! YouTube Data API, and records resolved channels in an append-only progress
//! file so that a run cut short by the daily quota picks up where it left off.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod input;
pub mod model;
pub mod progress;
pub mod report;
pub mod telemetry;
