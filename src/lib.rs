//! Session-only task and appointment manager.
//!
//! Tasks are grouped on a month calendar, filtered by category or date
//! range, and can carry documents and a one-shot reminder. Nothing is
//! persisted: the store lives exactly as long as the process.

pub mod blobs;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod notify;
pub mod session;
pub mod status;
pub mod store;
pub mod tui;
